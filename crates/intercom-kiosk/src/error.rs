use thiserror::Error;

use crate::step::KioskStep;

/// Errors raised by the kiosk flow.
///
/// A denied attempt is not an error: it ends in the feedback step with the
/// deny message on the panel.
#[derive(Debug, Error)]
pub enum KioskError {
    #[error("Storage error: {0}")]
    Storage(#[from] intercom_storage::StorageError),

    #[error("Door controller channel closed")]
    DoorChannelClosed,

    #[error("Invalid keypad key: {0}")]
    InvalidKey(String),

    #[error("Invalid kiosk step transition from {from} to {to}")]
    InvalidStepTransition { from: KioskStep, to: KioskStep },
}

pub type Result<T> = std::result::Result<T, KioskError>;
