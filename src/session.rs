//! Signed-in session: bearer token plus the user it belongs to.
//!
//! Controllers receive a `Session` explicitly instead of reading a shared
//! global. The token is zeroed when the session is dropped.

use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::models::RecordId;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No session token available")]
    MissingToken,

    #[error("Malformed access token: {0}")]
    MalformedToken(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════════════════════
// AuthToken, zeroed on drop
// ═══════════════════════════════════════════════════════════

/// Bearer token. Never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(raw: &str) -> Result<Self, SessionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionError::MissingToken);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

// ═══════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: RecordId,
    pub user_name: String,
}

/// Claims read from the access token payload.
#[derive(Deserialize)]
struct TokenClaims {
    sub: Option<RecordId>,
    username: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    token: AuthToken,
    user: UserIdentity,
}

/// On-disk form used by the CLI between invocations.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: UserIdentity,
}

impl Session {
    pub fn new(token: AuthToken, user: UserIdentity) -> Self {
        Self { token, user }
    }

    /// Build a session from a JWT access token, reading `sub` and
    /// `username` from its payload. The signature is not checked here;
    /// the backend does that on every call.
    pub fn from_access_token(raw: &str) -> Result<Self, SessionError> {
        let token = AuthToken::new(raw)?;
        let user = decode_identity(token.expose())?;
        Ok(Self { token, user })
    }

    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    pub fn load(path: &Path) -> Result<Option<Self>, SessionError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(path)?;
        let mut stored: StoredSession = serde_json::from_str(&raw)?;
        let token = AuthToken::new(&stored.token)?;
        stored.token.zeroize();
        Ok(Some(Self {
            token,
            user: stored.user,
        }))
    }

    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut stored = StoredSession {
            token: self.token.expose().to_string(),
            user: self.user.clone(),
        };
        let json = serde_json::to_string_pretty(&stored)?;
        stored.token.zeroize();
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn remove(path: &Path) -> Result<(), SessionError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn decode_identity(token: &str) -> Result<UserIdentity, SessionError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| SessionError::MalformedToken("expected three segments".into()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SessionError::MalformedToken(e.to_string()))?;
    let claims: TokenClaims = serde_json::from_slice(&bytes)
        .map_err(|e| SessionError::MalformedToken(e.to_string()))?;

    match (claims.sub, claims.username) {
        (Some(user_id), Some(user_name)) if !user_name.trim().is_empty() => {
            Ok(UserIdentity { user_id, user_name })
        }
        _ => Err(SessionError::MalformedToken(
            "token payload lacks sub or username".into(),
        )),
    }
}
