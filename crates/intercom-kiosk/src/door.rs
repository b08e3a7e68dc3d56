use serde::{Deserialize, Serialize};

/// Command sent to the door controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum DoorCommand {
    /// Release the entrance lock for the granted unit
    Open { unit_number: String },
}
