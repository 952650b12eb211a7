use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::{require, ModelError, RecordId};

/// Account details as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "nombre", default)]
    pub first_name: String,
    #[serde(rename = "apellido", default)]
    pub last_name: String,
    #[serde(
        rename = "fechaN",
        default,
        deserialize_with = "date_prefix",
        skip_serializing_if = "Option::is_none"
    )]
    pub birth_date: Option<NaiveDate>,
    #[serde(rename = "sexo", default)]
    pub sex: String,
    #[serde(default)]
    pub email: String,
    /// Only sent when the user changes it.
    #[serde(rename = "contraseña", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Accepts `2000-01-31` as well as `2000-01-31T00:00:00.000Z`.
fn date_prefix<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let date_part = s.split('T').next().unwrap_or(s);
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}

impl User {
    pub fn validate(&self) -> Result<(), ModelError> {
        require("nombre", &self.first_name)?;
        require("email", &self.email)
    }
}

/// Registration form; the password must be confirmed.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub password: String,
    pub confirm_password: String,
}

impl Registration {
    /// Validate and produce the body sent to `POST /users`.
    pub fn into_user(self) -> Result<User, ModelError> {
        self.user.validate()?;
        require("contraseña", &self.password)?;
        if self.password != self.confirm_password {
            return Err(ModelError::PasswordMismatch);
        }
        Ok(User {
            password: Some(self.password),
            ..self.user
        })
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    #[serde(rename = "contraseña")]
    pub password: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ModelError> {
        require("email", &self.email)?;
        require("contraseña", &self.password)
    }
}
