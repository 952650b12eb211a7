use serde::{Deserialize, Serialize};

use super::{require, ModelError, RecordId};

/// A medical appointment. `time` is kept as the text the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub title: String,
    pub doctor: String,
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub note: String,
}

impl Appointment {
    /// Every field but the note is required.
    pub fn validate(&self) -> Result<(), ModelError> {
        require("title", &self.title)?;
        require("doctor", &self.doctor)?;
        require("time", &self.time)?;
        require("location", &self.location)
    }
}
