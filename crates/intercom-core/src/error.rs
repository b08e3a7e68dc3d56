use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Credential format errors
    #[error("Invalid passcode: {0}")]
    InvalidPasscode(String),

    #[error("Invalid unit number: {0}")]
    InvalidUnitNumber(String),

    // Record errors
    #[error("Unknown visitor status: {0}")]
    UnknownVisitorStatus(String),

    #[error("Unknown access type: {0}")]
    UnknownAccessType(String),

    #[error("Unknown deny reason: {0}")]
    UnknownDenyReason(String),

    #[error("Invalid entry count: {0}")]
    InvalidEntryCount(i64),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, Error>;
