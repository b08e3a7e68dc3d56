use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::messages::DisplayMessages;
use crate::records::{ResidentRecord, VisitorRecord};
use crate::types::{AccessType, credentials_match};

/// Why an attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No resident or visitor has this unit and passcode
    NoMatch,
    /// Visitor is departed, denied, expired or archived
    StatusInvalid,
    /// Visitor passcode expiration time has passed
    Expired,
    /// Multi-use pass already used `usage_limit` times
    UsageLimitReached,
}

impl DenyReason {
    /// Stable code used in the audit log.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            DenyReason::NoMatch => "no_match",
            DenyReason::StatusInvalid => "status_invalid",
            DenyReason::Expired => "expired",
            DenyReason::UsageLimitReached => "usage_limit_reached",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for DenyReason {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "no_match" => Ok(DenyReason::NoMatch),
            "status_invalid" => Ok(DenyReason::StatusInvalid),
            "expired" => Ok(DenyReason::Expired),
            "usage_limit_reached" => Ok(DenyReason::UsageLimitReached),
            other => Err(crate::Error::UnknownDenyReason(other.to_string())),
        }
    }
}

/// Whose credential opened the door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AccessSubject {
    Resident(i64),
    Visitor(i64),
}

/// A change the caller must persist before the next attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RecordMutation {
    /// Set the visitor's status to `expired`
    MarkExpired { id: i64 },

    /// Store the incremented entry counter of a capped multi-use pass.
    ///
    /// `previous` is the counter value the decision was based on, so the
    /// persistence layer can apply the update as a compare-and-swap.
    EntryCount {
        id: i64,
        previous: u32,
        entry_count: u32,
        record: VisitorRecord,
    },
}

impl RecordMutation {
    /// Identifier of the visitor this mutation targets.
    #[must_use]
    pub fn visitor_id(&self) -> i64 {
        match self {
            RecordMutation::MarkExpired { id } | RecordMutation::EntryCount { id, .. } => *id,
        }
    }
}

/// Outcome of a single access attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Granted {
        subject: AccessSubject,
        mutation: Option<RecordMutation>,
    },
    Denied {
        reason: DenyReason,
        /// Visitor the attempt matched, if any
        visitor_id: Option<i64>,
        mutation: Option<RecordMutation>,
    },
}

impl Verdict {
    fn deny(reason: DenyReason, visitor_id: Option<i64>) -> Self {
        Verdict::Denied {
            reason,
            visitor_id,
            mutation: None,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Verdict::Granted { .. })
    }

    pub fn is_denied(&self) -> bool {
        !self.is_granted()
    }

    /// The deny reason, or `None` when granted.
    pub fn reason(&self) -> Option<DenyReason> {
        match self {
            Verdict::Granted { .. } => None,
            Verdict::Denied { reason, .. } => Some(*reason),
        }
    }

    /// The mutation the caller must persist, if any.
    pub fn mutation(&self) -> Option<&RecordMutation> {
        match self {
            Verdict::Granted { mutation, .. } | Verdict::Denied { mutation, .. } => {
                mutation.as_ref()
            }
        }
    }

    /// Panel text for this outcome.
    pub fn display_message(&self) -> &'static str {
        match self {
            Verdict::Granted { .. } => DisplayMessages::ACCESS_GRANTED,
            Verdict::Denied { reason, .. } => DisplayMessages::for_reason(*reason),
        }
    }
}

/// Pure decision procedure for kiosk passcode entry
///
/// Given a unit, a passcode and snapshots of the residents and visitors,
/// decides whether the door opens. The validator never touches storage:
/// changes such as marking a pass expired or bumping a multi-use counter come
/// back inside the [`Verdict`] for the caller to persist.
///
/// # Decision Order
///
/// First match wins:
///
/// 1. **Normalize**: trim unit and passcode
/// 2. **Resident**: first resident on the unit; matching passcode → `Granted`
/// 3. **Visitor lookup**: visitor with same unit and passcode, else `NoMatch`
/// 4. **Status**: departed/denied/expired/archived → `StatusInvalid`
/// 5. **Expiration**: deadline strictly in the past → `Expired` + `MarkExpired`
/// 6. **Usage**: capped multi-use pass with `entry_count >= limit` → `UsageLimitReached`
/// 7. **Grant**: capped multi-use passes return the incremented counter
///
/// # Examples
///
/// ```
/// use intercom_core::{AccessValidator, DenyReason, VisitorRecord};
///
/// let validator = AccessValidator::new();
/// let visitor = VisitorRecord::new(1, "204", "4521").multiple(Some(3), 2);
///
/// let verdict = validator.validate("204", "4521", &[], &[visitor.clone()]);
/// assert!(verdict.is_granted());
///
/// let used_up = visitor.multiple(Some(3), 3);
/// let verdict = validator.validate("204", "4521", &[], &[used_up]);
/// assert_eq!(verdict.reason(), Some(DenyReason::UsageLimitReached));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessValidator;

impl AccessValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate an attempt against the current wall clock.
    pub fn validate(
        &self,
        unit: &str,
        passcode: &str,
        residents: &[ResidentRecord],
        visitors: &[VisitorRecord],
    ) -> Verdict {
        self.validate_at(unit, passcode, residents, visitors, Utc::now())
    }

    /// Validate an attempt as of `now`.
    pub fn validate_at(
        &self,
        unit: &str,
        passcode: &str,
        residents: &[ResidentRecord],
        visitors: &[VisitorRecord],
        now: DateTime<Utc>,
    ) -> Verdict {
        let unit = unit.trim();
        let passcode = passcode.trim();

        // Residents take priority; a colliding visitor pass is never touched.
        if let Some(resident) = residents.iter().find(|r| r.unit_number.trim() == unit)
            && credentials_match(&resident.passcode, passcode)
        {
            return Verdict::Granted {
                subject: AccessSubject::Resident(resident.id),
                mutation: None,
            };
        }

        let Some(visitor) = visitors
            .iter()
            .find(|v| v.unit_number.trim() == unit && credentials_match(&v.passcode, passcode))
        else {
            return Verdict::deny(DenyReason::NoMatch, None);
        };

        if visitor.status.blocks_entry() {
            return Verdict::deny(DenyReason::StatusInvalid, Some(visitor.id));
        }

        if visitor.is_expired_at(now) {
            return Verdict::Denied {
                reason: DenyReason::Expired,
                visitor_id: Some(visitor.id),
                mutation: Some(RecordMutation::MarkExpired { id: visitor.id }),
            };
        }

        let Some(limit) = visitor.effective_limit() else {
            return Verdict::Granted {
                subject: AccessSubject::Visitor(visitor.id),
                mutation: None,
            };
        };

        if visitor.entry_count >= limit {
            return Verdict::deny(DenyReason::UsageLimitReached, Some(visitor.id));
        }

        debug_assert_eq!(visitor.access_type, AccessType::Multiple);
        let entry_count = visitor.entry_count + 1;
        let record = VisitorRecord {
            entry_count,
            ..visitor.clone()
        };

        Verdict::Granted {
            subject: AccessSubject::Visitor(visitor.id),
            mutation: Some(RecordMutation::EntryCount {
                id: visitor.id,
                previous: visitor.entry_count,
                entry_count,
                record,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VisitorStatus;
    use chrono::Duration;
    use rstest::rstest;

    fn validator() -> AccessValidator {
        AccessValidator::new()
    }

    fn resident(id: i64, unit: &str, code: &str) -> ResidentRecord {
        ResidentRecord::new(id, unit, code)
    }

    fn visitor(id: i64, unit: &str, code: &str) -> VisitorRecord {
        VisitorRecord::new(id, unit, code)
    }

    #[test]
    fn test_resident_grant() {
        let residents = [resident(1, "204", "1234")];
        let verdict = validator().validate("204", "1234", &residents, &[]);

        assert_eq!(
            verdict,
            Verdict::Granted {
                subject: AccessSubject::Resident(1),
                mutation: None,
            }
        );
        assert_eq!(verdict.display_message(), "Access granted");
    }

    #[test]
    fn test_inputs_and_records_are_trimmed() {
        let residents = [resident(1, " 204 ", " 1234")];
        let verdict = validator().validate("  204", "1234  ", &residents, &[]);
        assert!(verdict.is_granted());
    }

    #[test]
    fn test_resident_priority_over_visitor() {
        let residents = [resident(1, "204", "4521")];
        let visitors = [visitor(9, "204", "4521").multiple(Some(2), 0)];

        let verdict = validator().validate("204", "4521", &residents, &visitors);

        assert_eq!(
            verdict,
            Verdict::Granted {
                subject: AccessSubject::Resident(1),
                mutation: None,
            }
        );
        assert!(verdict.mutation().is_none());
    }

    #[rstest]
    #[case("205", "1234")]
    #[case("204", "1235")]
    #[case("20", "1234")]
    #[case("204", "123")]
    #[case("", "")]
    fn test_exact_match_required(#[case] unit: &str, #[case] code: &str) {
        let residents = [resident(1, "204", "1234")];
        let verdict = validator().validate(unit, code, &residents, &[]);
        assert_eq!(verdict.reason(), Some(DenyReason::NoMatch));
        assert!(verdict.mutation().is_none());
    }

    #[test]
    fn test_wrong_resident_passcode_falls_through_to_visitors() {
        let residents = [resident(1, "204", "1234")];
        let visitors = [visitor(5, "204", "7777")];

        let verdict = validator().validate("204", "7777", &residents, &visitors);
        assert_eq!(
            verdict,
            Verdict::Granted {
                subject: AccessSubject::Visitor(5),
                mutation: None,
            }
        );
    }

    #[test]
    fn test_visitor_on_other_unit_does_not_match() {
        let visitors = [visitor(5, "301", "7777")];
        let verdict = validator().validate("204", "7777", &[], &visitors);
        assert_eq!(verdict.reason(), Some(DenyReason::NoMatch));
    }

    #[rstest]
    #[case(VisitorStatus::Departed)]
    #[case(VisitorStatus::Denied)]
    #[case(VisitorStatus::Expired)]
    #[case(VisitorStatus::Archived)]
    fn test_status_gating(#[case] status: VisitorStatus) {
        let visitors = [visitor(3, "204", "4521").with_status(status)];
        let verdict = validator().validate("204", "4521", &[], &visitors);

        assert_eq!(
            verdict,
            Verdict::Denied {
                reason: DenyReason::StatusInvalid,
                visitor_id: Some(3),
                mutation: None,
            }
        );
    }

    #[test]
    fn test_status_checked_before_expiration() {
        let now = Utc::now();
        let visitors = [visitor(3, "204", "4521")
            .with_status(VisitorStatus::Denied)
            .expires_at(now - Duration::days(1))];

        let verdict = validator().validate_at("204", "4521", &[], &visitors, now);
        assert_eq!(verdict.reason(), Some(DenyReason::StatusInvalid));
        assert!(verdict.mutation().is_none());
    }

    #[test]
    fn test_arrived_visitor_is_granted() {
        let visitors = [visitor(3, "204", "4521").with_status(VisitorStatus::Arrived)];
        assert!(validator().validate("204", "4521", &[], &visitors).is_granted());
    }

    #[test]
    fn test_expired_passcode_requests_status_update() {
        let now = Utc::now();
        let visitors = [visitor(4, "204", "4521").expires_at(now - Duration::seconds(1))];

        let verdict = validator().validate_at("204", "4521", &[], &visitors, now);

        assert_eq!(
            verdict,
            Verdict::Denied {
                reason: DenyReason::Expired,
                visitor_id: Some(4),
                mutation: Some(RecordMutation::MarkExpired { id: 4 }),
            }
        );
        assert_eq!(verdict.mutation().map(RecordMutation::visitor_id), Some(4));
    }

    #[test]
    fn test_expiration_at_exact_instant_still_valid() {
        let now = Utc::now();
        let visitors = [visitor(4, "204", "4521").expires_at(now)];
        let verdict = validator().validate_at("204", "4521", &[], &visitors, now);
        assert!(verdict.is_granted());
    }

    #[test]
    fn test_future_expiration_is_granted() {
        let now = Utc::now();
        let visitors = [visitor(4, "204", "4521").expires_at(now + Duration::hours(2))];
        assert!(
            validator()
                .validate_at("204", "4521", &[], &visitors, now)
                .is_granted()
        );
    }

    #[test]
    fn test_usage_limit_boundary() {
        let below = [visitor(6, "204", "4521").multiple(Some(2), 1)];
        let verdict = validator().validate("204", "4521", &[], &below);

        match verdict.mutation() {
            Some(RecordMutation::EntryCount {
                id,
                previous,
                entry_count,
                record,
            }) => {
                assert_eq!(*id, 6);
                assert_eq!(*previous, 1);
                assert_eq!(*entry_count, 2);
                assert_eq!(record.entry_count, 2);
                assert_eq!(record.usage_limit, Some(2));
            }
            other => panic!("expected entry count mutation, got {other:?}"),
        }
        assert!(verdict.is_granted());

        let at_limit = [visitor(6, "204", "4521").multiple(Some(2), 2)];
        let verdict = validator().validate("204", "4521", &[], &at_limit);
        assert_eq!(
            verdict,
            Verdict::Denied {
                reason: DenyReason::UsageLimitReached,
                visitor_id: Some(6),
                mutation: None,
            }
        );
    }

    #[test]
    fn test_counter_past_limit_is_denied() {
        let visitors = [visitor(6, "204", "4521").multiple(Some(2), 5)];
        let verdict = validator().validate("204", "4521", &[], &visitors);
        assert_eq!(verdict.reason(), Some(DenyReason::UsageLimitReached));
    }

    #[test]
    fn test_multiple_without_limit_has_no_mutation() {
        let visitors = [visitor(6, "204", "4521").multiple(None, 40)];
        let verdict = validator().validate("204", "4521", &[], &visitors);
        assert_eq!(
            verdict,
            Verdict::Granted {
                subject: AccessSubject::Visitor(6),
                mutation: None,
            }
        );
    }

    #[rstest]
    #[case(None, 0)]
    #[case(Some(1), 0)]
    #[case(Some(1), 1)]
    #[case(Some(3), 99)]
    fn test_single_use_ignores_limit_fields(
        #[case] usage_limit: Option<u32>,
        #[case] entry_count: u32,
    ) {
        let mut pass = visitor(8, "204", "4521");
        pass.usage_limit = usage_limit;
        pass.entry_count = entry_count;

        let verdict = validator().validate("204", "4521", &[], &[pass]);
        assert_eq!(
            verdict,
            Verdict::Granted {
                subject: AccessSubject::Visitor(8),
                mutation: None,
            }
        );
    }

    #[test]
    fn test_repeated_status_denial_never_mutates() {
        let visitors = vec![visitor(3, "204", "4521").with_status(VisitorStatus::Denied)];
        let snapshot = visitors.clone();

        for _ in 0..5 {
            let verdict = validator().validate("204", "4521", &[], &visitors);
            assert_eq!(verdict.reason(), Some(DenyReason::StatusInvalid));
            assert!(verdict.mutation().is_none());
        }
        assert_eq!(visitors, snapshot);
    }

    #[test]
    fn test_example_scenario_from_json_snapshot() {
        let visitors: Vec<VisitorRecord> = serde_json::from_str(
            r#"[{"id":1,"unitNumber":"204","passcode":"4521","status":"expected",
                 "accessType":"multiple","usageLimit":"3","entryCount":2,
                 "passcodeExpiresAt":null}]"#,
        )
        .unwrap();

        let verdict = validator().validate("204", "4521", &[], &visitors);
        let Some(RecordMutation::EntryCount {
            id, entry_count, ..
        }) = verdict.mutation()
        else {
            panic!("expected entry count mutation");
        };
        assert_eq!((*id, *entry_count), (1, 3));

        let mut used = visitors.clone();
        used[0].entry_count = 3;
        let verdict = validator().validate("204", "4521", &[], &used);
        assert_eq!(verdict.reason(), Some(DenyReason::UsageLimitReached));
    }

    #[test]
    fn test_first_visitor_match_wins() {
        let visitors = [
            visitor(1, "204", "4521").with_status(VisitorStatus::Archived),
            visitor(2, "204", "4521"),
        ];
        let verdict = validator().validate("204", "4521", &[], &visitors);
        assert_eq!(verdict.reason(), Some(DenyReason::StatusInvalid));
    }

    #[test]
    fn test_deny_reason_codes_roundtrip() {
        for reason in [
            DenyReason::NoMatch,
            DenyReason::StatusInvalid,
            DenyReason::Expired,
            DenyReason::UsageLimitReached,
        ] {
            assert_eq!(reason.code().parse::<DenyReason>().unwrap(), reason);
        }
    }

    #[test]
    fn test_verdict_serializes_tagged() {
        let verdict = Verdict::Granted {
            subject: AccessSubject::Resident(1),
            mutation: None,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["verdict"], "granted");
        assert_eq!(json["subject"]["kind"], "resident");
    }
}
