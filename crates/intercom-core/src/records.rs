//! Resident and visitor snapshots consumed by the validator.
//!
//! These are plain values: the storage layer (or any other collaborator)
//! loads them, the validator reads them, and any change the validator wants
//! comes back as a [`RecordMutation`](crate::RecordMutation) instead of being
//! written here.
//!
//! On the wire the records use camelCase keys. `usageLimit` is accepted as a
//! number (fractions truncate) or as text with a leading integer; any other
//! value means no limit rather than a rejected record:
//!
//! ```
//! use intercom_core::{AccessType, VisitorRecord, VisitorStatus};
//!
//! let visitor: VisitorRecord = serde_json::from_str(
//!     r#"{"id":1,"unitNumber":"204","passcode":"4521","status":"expected",
//!         "accessType":"multiple","usageLimit":"3","entryCount":2,
//!         "passcodeExpiresAt":null}"#,
//! ).unwrap();
//!
//! assert_eq!(visitor.status, VisitorStatus::Expected);
//! assert_eq!(visitor.access_type, AccessType::Multiple);
//! assert_eq!(visitor.usage_limit, Some(3));
//! ```

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{AccessType, VisitorStatus, parse_usage_limit, positive_limit};

/// A resident's credential for one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentRecord {
    pub id: i64,
    pub unit_number: String,
    pub passcode: String,
}

impl ResidentRecord {
    pub fn new(id: i64, unit_number: impl Into<String>, passcode: impl Into<String>) -> Self {
        Self {
            id,
            unit_number: unit_number.into(),
            passcode: passcode.into(),
        }
    }
}

/// A visitor pass for one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    /// Identifier used to address the record when applying a mutation
    pub id: i64,

    pub unit_number: String,

    pub passcode: String,

    pub status: VisitorStatus,

    /// Past this instant the passcode no longer opens the door
    #[serde(default)]
    pub passcode_expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub access_type: AccessType,

    /// Maximum granted entries for a multi-use pass. `None` means unlimited.
    #[serde(default, deserialize_with = "deserialize_usage_limit")]
    pub usage_limit: Option<u32>,

    #[serde(default)]
    pub entry_count: u32,
}

impl VisitorRecord {
    /// Build a single-use pass in the `expected` status.
    pub fn new(id: i64, unit_number: impl Into<String>, passcode: impl Into<String>) -> Self {
        Self {
            id,
            unit_number: unit_number.into(),
            passcode: passcode.into(),
            status: VisitorStatus::Expected,
            passcode_expires_at: None,
            access_type: AccessType::Single,
            usage_limit: None,
            entry_count: 0,
        }
    }

    /// Turn this pass into a multi-use pass with an optional cap.
    #[must_use]
    pub fn multiple(mut self, usage_limit: Option<u32>, entry_count: u32) -> Self {
        self.access_type = AccessType::Multiple;
        self.usage_limit = usage_limit.filter(|limit| *limit > 0);
        self.entry_count = entry_count;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: VisitorStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.passcode_expires_at = Some(at);
        self
    }

    /// The cap that applies to this pass, if any.
    ///
    /// Only multi-use passes are capped; single-use passes ignore the
    /// limit and counter fields entirely.
    #[must_use]
    pub fn effective_limit(&self) -> Option<u32> {
        match self.access_type {
            AccessType::Multiple => self.usage_limit.filter(|limit| *limit > 0),
            AccessType::Single => None,
        }
    }

    /// Whether the passcode has expired at `now` (strictly after the deadline).
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.passcode_expires_at.is_some_and(|at| at < now)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawUsageLimit {
    Integer(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

fn deserialize_usage_limit<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawUsageLimit>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawUsageLimit::Integer(n)) => positive_limit(n),
        Some(RawUsageLimit::Float(f)) if f.is_finite() => positive_limit(f.trunc() as i64),
        Some(RawUsageLimit::Text(text)) => parse_usage_limit(&text),
        Some(RawUsageLimit::Float(_) | RawUsageLimit::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    #[rstest]
    #[case(r#""3""#, Some(3))]
    #[case("3", Some(3))]
    #[case("null", None)]
    #[case(r#""""#, None)]
    #[case(r#""many""#, None)]
    #[case("0", None)]
    #[case("-1", None)]
    #[case("2.0", Some(2))]
    #[case("2.5", Some(2))]
    #[case("1e1", Some(10))]
    #[case("0.5", None)]
    #[case("true", None)]
    #[case(r#"{"max":3}"#, None)]
    #[case("[3]", None)]
    #[case(r#""3 visits""#, Some(3))]
    fn test_usage_limit_is_lenient(#[case] raw: &str, #[case] expected: Option<u32>) {
        let json = format!(
            r#"{{"id":7,"unitNumber":"1","passcode":"1111","status":"arrived","accessType":"multiple","usageLimit":{raw}}}"#
        );
        let visitor: VisitorRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(visitor.usage_limit, expected);
        assert_eq!(visitor.entry_count, 0);
    }

    #[test]
    fn test_odd_usage_limit_keeps_other_visitors() {
        let visitors: Vec<VisitorRecord> = serde_json::from_str(
            r#"[
                {"id":1,"unitNumber":"204","passcode":"4521","status":"expected",
                 "accessType":"multiple","usageLimit":true},
                {"id":2,"unitNumber":"204","passcode":"7788","status":"arrived",
                 "accessType":"multiple","usageLimit":2.5}
            ]"#,
        )
        .unwrap();

        assert_eq!(visitors.len(), 2);
        assert_eq!(visitors[0].effective_limit(), None);
        assert_eq!(visitors[1].effective_limit(), Some(2));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let visitor: VisitorRecord = serde_json::from_str(
            r#"{"id":1,"unitNumber":"204","passcode":"4521","status":"expected"}"#,
        )
        .unwrap();

        assert_eq!(visitor.access_type, AccessType::Single);
        assert_eq!(visitor.usage_limit, None);
        assert_eq!(visitor.passcode_expires_at, None);
    }

    #[test]
    fn test_effective_limit_only_for_multiple() {
        let mut visitor = VisitorRecord::new(1, "204", "4521");
        visitor.usage_limit = Some(2);
        assert_eq!(visitor.effective_limit(), None);

        let visitor = visitor.multiple(Some(2), 0);
        assert_eq!(visitor.effective_limit(), Some(2));

        let unlimited = VisitorRecord::new(2, "204", "4521").multiple(Some(0), 0);
        assert_eq!(unlimited.effective_limit(), None);
    }

    #[test]
    fn test_expiry_is_strict() {
        let now = Utc::now();
        let visitor = VisitorRecord::new(1, "204", "4521").expires_at(now);
        assert!(!visitor.is_expired_at(now));
        assert!(visitor.is_expired_at(now + Duration::seconds(1)));
    }

    #[test]
    fn test_resident_serializes_camel_case() {
        let resident = ResidentRecord::new(3, "101", "9876");
        let json = serde_json::to_value(&resident).unwrap();
        assert_eq!(json["unitNumber"], "101");
    }
}
