//! Credential and kiosk limits shared across the workspace.
//!
//! Passcode bounds are enforced by callers (the kiosk and the CLI) before an
//! attempt reaches the validator. The validator itself accepts any string and
//! simply fails to match when the input is out of range.

/// Minimum passcode length in digits.
pub const MIN_PASSCODE_LENGTH: usize = 4;

/// Maximum passcode length in digits.
pub const MAX_PASSCODE_LENGTH: usize = 8;

/// Maximum unit identifier length accepted from keypad or CLI input.
pub const MAX_UNIT_LENGTH: usize = 10;

/// Default number of compare-and-swap retries when a concurrent kiosk
/// updates the same visitor between snapshot and write.
pub const DEFAULT_CONFLICT_RETRIES: usize = 5;

/// How long the kiosk keeps the feedback screen before resetting (milliseconds).
pub const DEFAULT_FEEDBACK_MS: u64 = 3_000;
