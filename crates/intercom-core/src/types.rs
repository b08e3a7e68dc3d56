use crate::{
    Result,
    constants::{MAX_PASSCODE_LENGTH, MAX_UNIT_LENGTH, MIN_PASSCODE_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Dwelling unit identifier (1-10 characters, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitNumber(String);

impl UnitNumber {
    /// Create a new unit number with validation.
    ///
    /// The value is trimmed before validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidUnitNumber` if the trimmed value is empty,
    /// longer than 10 characters, or contains non-ASCII characters.
    pub fn new(unit: &str) -> Result<Self> {
        let unit = unit.trim();

        if unit.is_empty() {
            return Err(Error::InvalidUnitNumber("unit number is empty".to_string()));
        }

        if unit.len() > MAX_UNIT_LENGTH {
            return Err(Error::InvalidUnitNumber(format!(
                "unit number must be at most {MAX_UNIT_LENGTH} chars, got {}",
                unit.len()
            )));
        }

        if !unit.is_ascii() {
            return Err(Error::InvalidUnitNumber(
                "unit number must be ASCII".to_string(),
            ));
        }

        Ok(UnitNumber(unit.to_string()))
    }

    /// Get the unit number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UnitNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        UnitNumber::new(s)
    }
}

/// Numeric passcode (4-8 digits)
///
/// # Security
/// Equality is constant-time so that comparing a submitted passcode
/// does not leak how many leading digits matched. `Debug` redacts the value.
#[derive(Clone, Eq, Serialize, Deserialize)]
pub struct Passcode(String);

impl Passcode {
    /// Create a new passcode with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidPasscode` if the trimmed value is not 4-8 ASCII digits.
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();

        let len = code.len();
        if !(MIN_PASSCODE_LENGTH..=MAX_PASSCODE_LENGTH).contains(&len) {
            return Err(Error::InvalidPasscode(format!(
                "passcode must be {MIN_PASSCODE_LENGTH}-{MAX_PASSCODE_LENGTH} digits, got {len}"
            )));
        }

        if !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidPasscode(
                "passcode must contain digits only".to_string(),
            ));
        }

        Ok(Passcode(code.to_string()))
    }

    /// Get the passcode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Passcode {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl fmt::Debug for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Passcode").field(&"****").finish()
    }
}

impl std::str::FromStr for Passcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Passcode::new(s)
    }
}

/// Compare two credential strings in constant time after trimming both.
///
/// Length differences still short-circuit, which only reveals the length
/// of the stored passcode (always 4-8 digits).
#[must_use]
pub fn credentials_match(stored: &str, submitted: &str) -> bool {
    stored
        .trim()
        .as_bytes()
        .ct_eq(submitted.trim().as_bytes())
        .into()
}

/// Visitor lifecycle status
///
/// # Lifecycle
///
/// - Expected → Arrived | Denied | Expired | Archived
/// - Arrived → Departed | Expired | Archived
/// - Departed | Denied | Expired → Archived
/// - Archived is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitorStatus {
    /// Registered by a resident, not yet at the door
    Expected,
    /// Checked in at least once
    Arrived,
    /// Left the building
    Departed,
    /// Access revoked by management
    Denied,
    /// Passcode expiration time has passed
    Expired,
    /// Kept only for history
    Archived,
}

impl VisitorStatus {
    /// Whether a visitor in this status may never be granted entry.
    #[must_use]
    pub fn blocks_entry(self) -> bool {
        matches!(
            self,
            VisitorStatus::Departed
                | VisitorStatus::Denied
                | VisitorStatus::Expired
                | VisitorStatus::Archived
        )
    }

    /// Check if transition to target status is valid from this status.
    #[must_use]
    pub fn can_transition_to(self, target: VisitorStatus) -> bool {
        matches!(
            (self, target),
            (
                VisitorStatus::Expected,
                VisitorStatus::Arrived
                    | VisitorStatus::Denied
                    | VisitorStatus::Expired
                    | VisitorStatus::Archived
            ) | (
                VisitorStatus::Arrived,
                VisitorStatus::Departed | VisitorStatus::Expired | VisitorStatus::Archived
            ) | (
                VisitorStatus::Departed | VisitorStatus::Denied | VisitorStatus::Expired,
                VisitorStatus::Archived
            )
        )
    }

    /// Validate a transition, returning the target status on success.
    ///
    /// # Errors
    /// Returns `Error::InvalidStateTransition` if the lifecycle forbids it.
    pub fn transition_to(self, target: VisitorStatus) -> Result<VisitorStatus> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(Error::InvalidStateTransition {
                from: self.to_string(),
                to: target.to_string(),
            })
        }
    }

    /// Lowercase storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VisitorStatus::Expected => "expected",
            VisitorStatus::Arrived => "arrived",
            VisitorStatus::Departed => "departed",
            VisitorStatus::Denied => "denied",
            VisitorStatus::Expired => "expired",
            VisitorStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for VisitorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VisitorStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expected" => Ok(VisitorStatus::Expected),
            "arrived" => Ok(VisitorStatus::Arrived),
            "departed" => Ok(VisitorStatus::Departed),
            "denied" => Ok(VisitorStatus::Denied),
            "expired" => Ok(VisitorStatus::Expired),
            "archived" => Ok(VisitorStatus::Archived),
            other => Err(Error::UnknownVisitorStatus(other.to_string())),
        }
    }
}

/// Visitor pass kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Ordinary pass, usage counters are ignored
    #[default]
    Single,
    /// Reusable pass, optionally capped by a usage limit
    Multiple,
}

impl AccessType {
    /// Lowercase storage representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AccessType::Single => "single",
            AccessType::Multiple => "multiple",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AccessType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(AccessType::Single),
            "multiple" => Ok(AccessType::Multiple),
            other => Err(Error::UnknownAccessType(other.to_string())),
        }
    }
}

/// Normalize a raw usage limit into "some positive cap" or "no limit".
///
/// Reads the leading integer the way management screens write it (`"3"`,
/// `" 3 "`, `"3 visits"`, `"2.5"`). Text without leading digits, zero and
/// negative values all mean no limit.
#[must_use]
pub fn parse_usage_limit(raw: &str) -> Option<u32> {
    let raw = raw.trim_start();
    if raw.starts_with('-') {
        return None;
    }
    let rest = raw.strip_prefix('+').unwrap_or(raw);
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<i64>().ok().and_then(positive_limit)
}

/// Keep a numeric usage limit only if it is a positive integer.
#[must_use]
pub fn positive_limit(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|limit| *limit > 0)
}
