//! Client-side API errors.
//!
//! `Display` carries the internal detail that goes to the log;
//! `user_message()` is the generic copy shown to the user.

use crate::models::ModelError;
use crate::session::SessionError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Invalid request: {0}")]
    Invalid(#[from] ModelError),

    #[error("Backend is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Backend returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Empty response from backend")]
    EmptyResponse,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Login rejected: no access token in response")]
    InvalidCredentials,
}

impl ApiError {
    /// HTTP status for backend errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Session(SessionError::MissingToken) => {
                "You are not signed in. Please log in first.".into()
            }
            Self::Session(_) => "Your session is invalid. Please log in again.".into(),
            Self::Invalid(e) => e.to_string(),
            Self::Connection(_) | Self::Timeout(_) | Self::HttpClient(_) => {
                "Could not reach the server. Check your connection and try again.".into()
            }
            Self::Status { status: 401, .. } | Self::Status { status: 403, .. } => {
                "Your session has expired. Please log in again.".into()
            }
            Self::Status { status: 404, .. } => "The requested record was not found.".into(),
            Self::Status { .. } => "The server could not complete the request.".into(),
            Self::EmptyResponse | Self::ResponseParsing(_) => {
                "The server sent an unexpected response.".into()
            }
            Self::InvalidCredentials => "Incorrect email or password.".into(),
        }
    }
}
