//! Account records (`/users`).

use reqwest::Method;

use super::client::parse_body;
use super::{ApiClient, ApiError};
use crate::models::{RecordId, User};
use crate::session::Session;

const BASE: &str = "/users";

/// Text the backend puts in a delete reply that it marks as failed even
/// though the account is gone.
const DELETED_MARKER: &str = "successfully deleted";

pub struct UsersApi<'a> {
    client: &'a ApiClient,
    session: &'a Session,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a ApiClient, session: &'a Session) -> Self {
        Self { client, session }
    }

    /// The signed-in user's profile.
    pub async fn current(&self) -> Result<User, ApiError> {
        let id = self.session.user().user_id.clone();
        self.fetch(&id).await
    }

    pub async fn fetch(&self, id: &RecordId) -> Result<User, ApiError> {
        self.client
            .get(&format!("{BASE}/user"), Some(id), self.session)
            .await
    }

    pub async fn update(&self, id: &RecordId, user: &User) -> Result<(), ApiError> {
        user.validate()?;
        self.client
            .put(&format!("{BASE}/update"), id, self.session, user)
            .await?;
        tracing::info!(id = %id, "Account updated");
        Ok(())
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        let path = format!("{BASE}/delete");
        let raw = self
            .client
            .execute(Method::DELETE, &path, Some(id), Some(self.session), None)
            .await?;

        if raw.status.is_success() {
            tracing::info!(id = %id, "Account deleted");
            return Ok(());
        }
        if reports_deleted(&raw.body) {
            tracing::warn!(
                id = %id,
                status = raw.status.as_u16(),
                "Backend flagged account delete as failed but reports it deleted"
            );
            return Ok(());
        }
        tracing::warn!(
            path = %path,
            status = raw.status.as_u16(),
            body = %raw.body,
            "backend returned error"
        );
        Err(ApiError::Status {
            status: raw.status.as_u16(),
            body: raw.body,
        })
    }
}

fn reports_deleted(body: &str) -> bool {
    #[derive(serde::Deserialize)]
    struct Reply {
        message: Option<String>,
    }
    parse_body::<Reply>(BASE, body)
        .ok()
        .and_then(|r| r.message)
        .is_some_and(|m| m.contains(DELETED_MARKER))
}
