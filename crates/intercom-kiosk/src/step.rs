//! Kiosk step machine.
//!
//! # Valid Transitions
//!
//! - UnitEntry → PasscodeEntry → Processing → Feedback → UnitEntry
//! - PasscodeEntry → UnitEntry (cancel)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the kiosk is in an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KioskStep {
    /// Typing the unit number
    UnitEntry,

    /// Typing the passcode
    PasscodeEntry,

    /// Credential being checked; keys are ignored
    Processing,

    /// Showing the outcome until a key press or the feedback timeout
    Feedback,
}

impl fmt::Display for KioskStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            KioskStep::UnitEntry => "UnitEntry",
            KioskStep::PasscodeEntry => "PasscodeEntry",
            KioskStep::Processing => "Processing",
            KioskStep::Feedback => "Feedback",
        };
        write!(f, "{}", step)
    }
}

impl KioskStep {
    /// Check if transition to `target` is valid from this step.
    ///
    /// ```
    /// use intercom_kiosk::KioskStep;
    ///
    /// assert!(KioskStep::UnitEntry.can_transition_to(&KioskStep::PasscodeEntry));
    /// assert!(!KioskStep::UnitEntry.can_transition_to(&KioskStep::Processing));
    /// ```
    pub fn can_transition_to(&self, target: &KioskStep) -> bool {
        matches!(
            (self, target),
            (KioskStep::UnitEntry, KioskStep::PasscodeEntry)
                | (KioskStep::PasscodeEntry, KioskStep::Processing | KioskStep::UnitEntry)
                | (KioskStep::Processing, KioskStep::Feedback)
                | (KioskStep::Feedback, KioskStep::UnitEntry)
        )
    }
}
