//! Keypad keys and the line format used to feed them from a terminal.
//!
//! A line holds whitespace-separated tokens. A run of digits types each
//! digit; `#` or `enter` confirms, `*` or `cancel` cancels, `c` or `clear`
//! clears the buffer and `<` or `backspace` deletes one digit:
//!
//! ```
//! use intercom_kiosk::{KeypadKey, parse_keys};
//!
//! let keys = parse_keys("204 # 4521 #").unwrap();
//! assert_eq!(keys.len(), 9);
//! assert_eq!(keys[3], KeypadKey::Enter);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KioskError, Result};

/// A key on the entrance panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeypadKey {
    /// Numeric digit (0-9)
    Digit(u8),
    Backspace,
    Clear,
    Enter,
    Cancel,
}

impl KeypadKey {
    /// Create a digit key.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(KioskError::InvalidKey(d.to_string()));
        }
        Ok(KeypadKey::Digit(d))
    }

    /// The ASCII character for a digit key
    pub fn as_char(&self) -> Option<char> {
        match self {
            KeypadKey::Digit(d) => char::from_digit(u32::from(*d), 10),
            _ => None,
        }
    }
}

impl fmt::Display for KeypadKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeypadKey::Digit(d) => write!(f, "{}", d),
            KeypadKey::Backspace => write!(f, "<"),
            KeypadKey::Clear => write!(f, "C"),
            KeypadKey::Enter => write!(f, "#"),
            KeypadKey::Cancel => write!(f, "*"),
        }
    }
}

impl FromStr for KeypadKey {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        match token.to_ascii_lowercase().as_str() {
            "#" | "enter" => Ok(KeypadKey::Enter),
            "*" | "cancel" => Ok(KeypadKey::Cancel),
            "c" | "clear" => Ok(KeypadKey::Clear),
            "<" | "backspace" => Ok(KeypadKey::Backspace),
            other => match other.as_bytes() {
                [d @ b'0'..=b'9'] => KeypadKey::digit(d - b'0'),
                _ => Err(KioskError::InvalidKey(token.to_string())),
            },
        }
    }
}

/// Parse one terminal line into keys.
///
/// # Errors
///
/// Returns [`KioskError::InvalidKey`] for the first token that is neither a
/// digit run nor a named key. No keys are returned in that case.
pub fn parse_keys(line: &str) -> Result<Vec<KeypadKey>> {
    let mut keys = Vec::new();
    for token in line.split_whitespace() {
        if token.bytes().all(|b| b.is_ascii_digit()) {
            keys.extend(token.bytes().map(|b| KeypadKey::Digit(b - b'0')));
        } else {
            keys.push(token.parse()?);
        }
    }
    Ok(keys)
}
