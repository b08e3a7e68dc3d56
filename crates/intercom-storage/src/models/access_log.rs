use chrono::{DateTime, Utc};
use intercom_core::{AccessSubject, DenyReason, Verdict};
use serde::{Deserialize, Serialize};

/// Access log entry representing a kiosk attempt (granted or denied)
///
/// Every attempt is logged, including attempts that matched nobody, so that
/// management can review activity per unit.
///
/// # Fields
///
/// * `unit_number` - Unit entered at the kiosk (trimmed)
/// * `resident_id` - Resident whose passcode opened the door, if any
/// * `visitor_id` - Visitor the attempt matched, granted or not
/// * `granted` - Whether the door opened
/// * `reason` - Deny reason code (`no_match`, `status_invalid`, `expired`,
///   `usage_limit_reached`), NULL when granted
/// * `display_message` - Text shown on the kiosk panel
/// * `timestamp` - When the attempt was decided
/// * `created_at` - When the row was written
///
/// The submitted passcode is never stored.
///
/// # Examples
///
/// ```
/// use intercom_storage::models::AccessLog;
/// use intercom_core::{AccessSubject, Verdict};
/// use chrono::Utc;
///
/// let verdict = Verdict::Granted {
///     subject: AccessSubject::Resident(42),
///     mutation: None,
/// };
/// let log = AccessLog::from_verdict("204", &verdict, Utc::now());
///
/// assert!(log.was_granted());
/// assert_eq!(log.resident_id, Some(42));
/// assert_eq!(log.display_message.as_deref(), Some("Access granted"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessLog {
    /// Auto-increment primary key
    pub id: i64,

    pub unit_number: String,

    pub resident_id: Option<i64>,

    pub visitor_id: Option<i64>,

    pub granted: bool,

    pub reason: Option<String>,

    pub display_message: Option<String>,

    /// Decision time
    pub timestamp: DateTime<Utc>,

    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl AccessLog {
    /// Build the log row for a validator verdict.
    pub fn from_verdict(unit_number: &str, verdict: &Verdict, timestamp: DateTime<Utc>) -> Self {
        let (resident_id, visitor_id, reason) = match verdict {
            Verdict::Granted {
                subject: AccessSubject::Resident(id),
                ..
            } => (Some(*id), None, None),
            Verdict::Granted {
                subject: AccessSubject::Visitor(id),
                ..
            } => (None, Some(*id), None),
            Verdict::Denied {
                reason, visitor_id, ..
            } => (None, *visitor_id, Some(reason.code().to_string())),
        };

        Self {
            id: 0, // Will be set by database
            unit_number: unit_number.trim().to_string(),
            resident_id,
            visitor_id,
            granted: verdict.is_granted(),
            reason,
            display_message: Some(verdict.display_message().to_string()),
            timestamp,
            created_at: Utc::now(),
        }
    }

    /// Get the deny reason as an enum
    pub fn get_reason(&self) -> Option<DenyReason> {
        self.reason.as_deref().and_then(|code| code.parse().ok())
    }

    /// Check if this was a successful access (granted)
    pub fn was_granted(&self) -> bool {
        self.granted
    }

    /// Check if this was a denied access
    pub fn was_denied(&self) -> bool {
        !self.granted
    }
}
