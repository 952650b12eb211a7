//! Login and account registration. Neither call carries a token.

use serde::Deserialize;

use super::{ApiClient, ApiError};
use crate::models::{Credentials, Registration, User};
use crate::session::Session;

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Exchange credentials for a session.
pub async fn login(client: &ApiClient, credentials: &Credentials) -> Result<Session, ApiError> {
    credentials.validate()?;
    let response: LoginResponse = client.post("/auth/login", None, credentials).await?;
    let token = response
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::InvalidCredentials)?;
    let session = Session::from_access_token(&token)?;
    tracing::info!(user = %session.user().user_name, "Signed in");
    Ok(session)
}

/// Create a new account.
pub async fn register(client: &ApiClient, registration: Registration) -> Result<User, ApiError> {
    let user = registration.into_user()?;
    let created: User = client.post("/users", None, &user).await?;
    tracing::info!(id = ?created.id.as_ref().map(|i| i.to_string()), "Account registered");
    Ok(created)
}
