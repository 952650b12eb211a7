use serde::{Deserialize, Serialize};

use super::{require, ModelError, RecordId};

/// A doctor in the user's address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "especialidad", default)]
    pub specialty: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefonoOficina", default)]
    pub office_phone: String,
    #[serde(rename = "telefonoMovil", default)]
    pub mobile_phone: String,
    #[serde(rename = "telefonoEmergencia", default)]
    pub emergency_phone: String,
}

impl Doctor {
    pub fn new(name: &str, specialty: &str) -> Self {
        Self {
            id: None,
            name: name.trim().to_string(),
            specialty: specialty.trim().to_string(),
            email: String::new(),
            office_phone: String::new(),
            mobile_phone: String::new(),
            emergency_phone: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        require("nombre", &self.name)
    }
}
