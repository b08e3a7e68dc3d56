use chrono::{DateTime, Utc};
use intercom_core::ResidentRecord;
use serde::{Deserialize, Serialize};

/// Resident entity holding a unit passcode
///
/// # Database Schema
///
/// Maps to the `residents` table. Several residents may share a unit; the
/// validator only consults the first one (lowest `id`) for that unit.
///
/// # Examples
///
/// ```
/// use intercom_storage::models::Resident;
///
/// let resident = Resident::new("Ana Souza", "204", "1234");
/// let record = resident.to_record();
///
/// assert_eq!(record.unit_number, "204");
/// assert_eq!(record.passcode, "1234");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resident {
    /// Auto-increment primary key
    pub id: i64,

    /// Display name (max 100 characters)
    pub name: String,

    /// Dwelling unit identifier
    pub unit_number: String,

    /// Numeric passcode (4-8 digits)
    #[serde(skip_serializing)]
    pub passcode: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Resident {
    /// Create an unsaved resident (`id` is assigned on insert).
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
            created_at: now,
            updated_at: now,
        }
    }

    /// Snapshot for the access validator.
    pub fn to_record(&self) -> ResidentRecord {
        ResidentRecord::new(self.id, self.unit_number.clone(), self.passcode.clone())
    }
}
