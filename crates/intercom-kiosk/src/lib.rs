//! Entrance kiosk flow for the intercom.
//!
//! Turns keypad presses into access attempts: the visitor types a unit,
//! confirms, types a passcode and confirms again. The attempt is checked
//! through [`AccessCheck`] and a granted one produces a
//! [`DoorCommand::Open`] on the door channel.
//!
//! # Steps
//!
//! ```text
//! UnitEntry --Enter--> PasscodeEntry --Enter--> Processing --> Feedback
//!     ^                     |                                     |
//!     +-------Cancel--------+                                     |
//!     +---------------key press or feedback timeout---------------+
//! ```

pub mod check;
pub mod door;
pub mod error;
pub mod keypad;
pub mod session;
pub mod step;

pub use check::AccessCheck;
pub use door::DoorCommand;
pub use error::{KioskError, Result};
pub use keypad::{KeypadKey, parse_keys};
pub use session::{KioskConfig, KioskSession};
pub use step::KioskStep;
