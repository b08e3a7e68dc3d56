//! Domain core for the intercom kiosk.
//!
//! Holds the credential types, the resident/visitor snapshot records and the
//! pure [`AccessValidator`] that turns a `(unit, passcode)` attempt into a
//! [`Verdict`]. Nothing in this crate performs I/O; persistence lives in
//! `intercom-storage` and the keypad flow in `intercom-kiosk`.

pub mod constants;
pub mod error;
pub mod messages;
pub mod records;
pub mod types;
pub mod validator;

pub use error::{Error, Result};
pub use messages::DisplayMessages;
pub use records::{ResidentRecord, VisitorRecord};
pub use types::*;
pub use validator::{AccessSubject, AccessValidator, DenyReason, RecordMutation, Verdict};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
