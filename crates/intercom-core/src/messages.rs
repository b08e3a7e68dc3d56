//! Display messages for kiosk feedback
//!
//! Deny reasons are ordinary values; the kiosk maps each one to a short
//! line of text shown on the entrance panel.
//!
//! # Usage
//!
//! ```
//! use intercom_core::{DenyReason, DisplayMessages};
//!
//! assert_eq!(DisplayMessages::ACCESS_GRANTED, "Access granted");
//! assert_eq!(
//!     DisplayMessages::for_reason(DenyReason::Expired),
//!     DisplayMessages::PASSCODE_EXPIRED
//! );
//! ```

use crate::validator::DenyReason;

/// Kiosk panel messages.
///
/// Messages are kept under 32 characters so they fit a single panel line.
pub struct DisplayMessages;

impl DisplayMessages {
    /// All checks passed, door opens
    pub const ACCESS_GRANTED: &'static str = "Access granted";

    /// No resident or visitor matches the unit and passcode
    pub const INVALID_PASSCODE: &'static str = "Invalid unit or passcode";

    /// Visitor status is departed, denied, expired or archived
    pub const PASS_NOT_VALID: &'static str = "Visitor pass is not valid";

    /// Visitor passcode expiration time has passed
    pub const PASSCODE_EXPIRED: &'static str = "Visitor passcode expired";

    /// Multi-use visitor pass has no entries left
    pub const USAGE_LIMIT_REACHED: &'static str = "Pass usage limit reached";

    /// Kiosk rejected the unit before validation
    pub const ENTER_UNIT: &'static str = "Enter unit number";

    /// Unit accepted, waiting for the passcode
    pub const ENTER_PASSCODE: &'static str = "Enter passcode";

    /// Kiosk rejected the passcode length before validation
    pub const PASSCODE_LENGTH: &'static str = "Passcode must be 4-8 digits";

    /// Kiosk is checking the credential
    pub const PROCESSING: &'static str = "Checking...";

    /// Storage or internal failure while checking
    pub const SYSTEM_ERROR: &'static str = "System error, try again";

    /// Map a deny reason to its panel message.
    #[must_use]
    pub fn for_reason(reason: DenyReason) -> &'static str {
        match reason {
            DenyReason::NoMatch => Self::INVALID_PASSCODE,
            DenyReason::StatusInvalid => Self::PASS_NOT_VALID,
            DenyReason::Expired => Self::PASSCODE_EXPIRED,
            DenyReason::UsageLimitReached => Self::USAGE_LIMIT_REACHED,
        }
    }
}
