//! Property-based tests for the access validator.
//!
//! These tests use proptest to generate residents and visitors and verify
//! that the decision rules hold for every generated combination.

use chrono::{Duration, Utc};
use intercom_core::{
    AccessSubject, AccessValidator, DenyReason, RecordMutation, ResidentRecord, VisitorRecord,
    VisitorStatus,
};
use proptest::prelude::*;

/// Strategy for unit identifiers as management screens enter them.
fn valid_unit() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9]{1,4}[A-D]?").expect("Failed to create unit regex strategy")
}

/// Strategy for 4-8 digit passcodes.
fn valid_passcode() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9]{4,8}").expect("Failed to create passcode regex strategy")
}

fn any_status() -> impl Strategy<Value = VisitorStatus> {
    prop_oneof![
        Just(VisitorStatus::Expected),
        Just(VisitorStatus::Arrived),
        Just(VisitorStatus::Departed),
        Just(VisitorStatus::Denied),
        Just(VisitorStatus::Expired),
        Just(VisitorStatus::Archived),
    ]
}

/// Replace the character at `index` with a different printable one.
fn mutate_char(value: &str, index: usize) -> String {
    let mut chars: Vec<char> = value.chars().collect();
    let i = index % chars.len();
    chars[i] = if chars[i] == 'X' { 'Y' } else { 'X' };
    chars.into_iter().collect()
}

proptest! {
    /// Property: any single-character change to unit or passcode of a
    /// resident credential yields NoMatch.
    #[test]
    fn prop_exact_match_required(
        unit in valid_unit(),
        passcode in valid_passcode(),
        index in any::<usize>(),
        change_unit in any::<bool>(),
    ) {
        let residents = [ResidentRecord::new(1, unit.clone(), passcode.clone())];
        let validator = AccessValidator::new();

        prop_assert!(validator.validate(&unit, &passcode, &residents, &[]).is_granted());

        let (u, p) = if change_unit {
            (mutate_char(&unit, index), passcode.clone())
        } else {
            (unit.clone(), mutate_char(&passcode, index))
        };
        let verdict = validator.validate(&u, &p, &residents, &[]);
        prop_assert_eq!(verdict.reason(), Some(DenyReason::NoMatch));
        prop_assert!(verdict.mutation().is_none());
    }

    /// Property: a resident sharing a visitor's credential always wins and
    /// never produces a mutation.
    #[test]
    fn prop_resident_priority(
        unit in valid_unit(),
        passcode in valid_passcode(),
        status in any_status(),
        limit in 1u32..10,
        count in 0u32..10,
    ) {
        let residents = [ResidentRecord::new(11, unit.clone(), passcode.clone())];
        let visitors = [VisitorRecord::new(22, unit.clone(), passcode.clone())
            .with_status(status)
            .multiple(Some(limit), count)];

        let verdict = AccessValidator::new().validate(&unit, &passcode, &residents, &visitors);
        prop_assert!(verdict.is_granted());
        prop_assert!(verdict.mutation().is_none());
    }

    /// Property: a capped pass never hands out a counter beyond its limit.
    #[test]
    fn prop_counter_never_exceeds_limit(
        limit in 1u32..20,
        count in 0u32..40,
    ) {
        let visitors = [VisitorRecord::new(5, "204", "4521").multiple(Some(limit), count)];
        let verdict = AccessValidator::new().validate("204", "4521", &[], &visitors);

        match verdict.mutation() {
            Some(RecordMutation::EntryCount { entry_count, .. }) => {
                prop_assert!(*entry_count <= limit);
                prop_assert_eq!(*entry_count, count + 1);
            }
            Some(other) => prop_assert!(false, "unexpected mutation {:?}", other),
            None => prop_assert_eq!(verdict.reason(), Some(DenyReason::UsageLimitReached)),
        }
    }

    /// Property: blocked statuses are denied no matter the other fields.
    #[test]
    fn prop_blocked_status_never_granted(
        status in any_status(),
        expired in any::<bool>(),
    ) {
        let now = Utc::now();
        let mut visitor = VisitorRecord::new(3, "204", "4521").with_status(status);
        if expired {
            visitor = visitor.expires_at(now - Duration::minutes(5));
        }

        let verdict = AccessValidator::new().validate_at("204", "4521", &[], &[visitor], now);
        if status.blocks_entry() {
            prop_assert_eq!(verdict.reason(), Some(DenyReason::StatusInvalid));
        } else if expired {
            prop_assert_eq!(verdict.reason(), Some(DenyReason::Expired));
        } else {
            prop_assert!(
                matches!(verdict, intercom_core::Verdict::Granted { subject: AccessSubject::Visitor(3), .. }),
                "expected visitor grant"
            );
        }
    }
}
