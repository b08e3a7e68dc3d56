use chrono::{DateTime, Utc};
use intercom_core::{AccessType, VisitorRecord, VisitorStatus, positive_limit};
use serde::{Deserialize, Serialize};

use crate::error::StorageResult;

/// Visitor pass entity
///
/// # Fields
///
/// * `status` - Lifecycle status as lowercase text (see [`VisitorStatus`])
/// * `passcode_expires_at` - Optional deadline after which the passcode stops working
/// * `access_type` - `single` or `multiple` as lowercase text
/// * `usage_limit` - Cap on granted entries for `multiple` passes; NULL, zero
///   or negative means unlimited
/// * `entry_count` - Granted entries so far, only maintained for capped passes
/// * `host_resident_id` - Resident who registered the visitor, if known
///
/// Text columns are exposed as enums through [`Visitor::get_status`] and
/// [`Visitor::get_access_type`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Visitor {
    /// Auto-increment primary key
    pub id: i64,

    /// Display name (max 100 characters)
    pub name: String,

    /// Unit being visited
    pub unit_number: String,

    /// Numeric passcode (4-8 digits)
    #[serde(skip_serializing)]
    pub passcode: String,

    /// Lifecycle status (`expected`, `arrived`, `departed`, `denied`, `expired`, `archived`)
    pub status: String,

    pub passcode_expires_at: Option<DateTime<Utc>>,

    /// Pass kind (`single` or `multiple`)
    pub access_type: String,

    pub usage_limit: Option<i64>,

    pub entry_count: i64,

    pub host_resident_id: Option<i64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Visitor {
    /// Create an unsaved single-use visitor pass in the `expected` status.
    pub fn new(
        name: impl Into<String>,
        unit_number: impl Into<String>,
        passcode: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            unit_number: unit_number.into(),
            passcode: passcode.into(),
            status: VisitorStatus::Expected.to_string(),
            passcode_expires_at: None,
            access_type: AccessType::Single.to_string(),
            usage_limit: None,
            entry_count: 0,
            host_resident_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Make this a multi-use pass with an optional cap.
    pub fn multiple(mut self, usage_limit: Option<i64>) -> Self {
        self.access_type = AccessType::Multiple.to_string();
        self.usage_limit = usage_limit;
        self
    }

    /// Set the passcode deadline.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.passcode_expires_at = Some(at);
        self
    }

    /// Link the pass to the resident who registered it.
    pub fn hosted_by(mut self, resident_id: i64) -> Self {
        self.host_resident_id = Some(resident_id);
        self
    }

    /// Get the status as an enum
    pub fn get_status(&self) -> Option<VisitorStatus> {
        self.status.parse().ok()
    }

    /// Get the access type as an enum
    pub fn get_access_type(&self) -> Option<AccessType> {
        self.access_type.parse().ok()
    }

    /// Snapshot for the access validator.
    ///
    /// `usage_limit` is normalized here: only positive values are kept.
    ///
    /// # Errors
    ///
    /// Returns a domain error if `status` or `access_type` hold an unknown
    /// value, or if `entry_count` does not fit a counter.
    pub fn to_record(&self) -> StorageResult<VisitorRecord> {
        Ok(VisitorRecord {
            id: self.id,
            unit_number: self.unit_number.clone(),
            passcode: self.passcode.clone(),
            status: self.status.parse()?,
            passcode_expires_at: self.passcode_expires_at,
            access_type: self.access_type.parse()?,
            usage_limit: self.usage_limit.and_then(positive_limit),
            entry_count: u32::try_from(self.entry_count)
                .map_err(|_| intercom_core::Error::InvalidEntryCount(self.entry_count))?,
        })
    }
}
