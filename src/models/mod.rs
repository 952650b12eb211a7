//! Records exchanged with the MiSalud backend.
//!
//! Field names are English; serde renames map them to the backend's JSON keys.

pub mod agenda;
pub mod appointment;
pub mod clock;
pub mod doctor;
pub mod enums;
pub mod medication;
pub mod user;

pub use agenda::AgendaEntry;
pub use appointment::Appointment;
pub use doctor::Doctor;
pub use enums::{Frequency, MealRelation, Presentation};
pub use medication::{Dose, Medication};
pub use user::{Credentials, Registration, User};

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Note text is empty")]
    EmptyNote,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        Err(ModelError::MissingField(field))
    } else {
        Ok(())
    }
}

/// serde helper: `null` reads as the field's default, like a missing key.
/// Older clients wrote `NaN` counts, which JSON encodes as `null`.
pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Server-assigned identifier. The backend hands out numeric ids for some
/// collections and string ids for others.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl std::str::FromStr for RecordId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ModelError::MissingField("id"));
        }
        Ok(trimmed
            .parse::<i64>()
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(trimmed.to_string())))
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}
