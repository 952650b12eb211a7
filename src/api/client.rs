use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::ApiError;
use crate::config::ApiConfig;
use crate::models::RecordId;
use crate::session::Session;

/// HTTP client for the MiSalud backend.
///
/// One request, one response: no retries, no backoff. Every call either
/// yields a fully parsed value or an error; partial responses are never
/// applied.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    timeout_secs: u64,
}

/// Status and body of a completed request.
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            timeout_secs: config.timeout.as_secs(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and return status + body without judging either.
    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        id: Option<&RecordId>,
        session: Option<&Session>,
        body: Option<serde_json::Value>,
    ) -> Result<RawResponse, ApiError> {
        let url = self.url(path);
        tracing::debug!(method = %method, url = %url, id = ?id.map(|i| i.to_string()), "backend request");

        let mut request = self.http.request(method, &url);
        if let Some(id) = id {
            request = request.query(&[("id", id.to_string())]);
        }
        if let Some(session) = session {
            request = request.bearer_auth(session.token().expose());
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() {
                ApiError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::HttpClient(e.to_string())
            }
        })?;
        Ok(RawResponse { status, body })
    }

    /// Send a request and require a 2xx status.
    async fn checked(
        &self,
        method: Method,
        path: &str,
        id: Option<&RecordId>,
        session: Option<&Session>,
        body: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        let raw = self.execute(method.clone(), path, id, session, body).await?;
        if !raw.status.is_success() {
            tracing::warn!(
                method = %method,
                path,
                status = raw.status.as_u16(),
                body = %raw.body,
                "backend returned error"
            );
            return Err(ApiError::Status {
                status: raw.status.as_u16(),
                body: raw.body,
            });
        }
        Ok(raw.body)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        id: Option<&RecordId>,
        session: &Session,
    ) -> Result<T, ApiError> {
        let body = self.checked(Method::GET, path, id, Some(session), None).await?;
        parse_body(path, &body)
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        session: Option<&Session>,
        payload: &B,
    ) -> Result<T, ApiError> {
        let json = to_json(payload)?;
        let body = self.checked(Method::POST, path, None, session, Some(json)).await?;
        parse_body(path, &body)
    }

    /// PUT the full record. The echoed body is not used; callers keep
    /// the record they sent.
    pub(crate) async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        id: &RecordId,
        session: &Session,
        payload: &B,
    ) -> Result<(), ApiError> {
        let json = to_json(payload)?;
        self.checked(Method::PUT, path, Some(id), Some(session), Some(json))
            .await
            .map(|_| ())
    }

    /// DELETE; whatever body comes back is ignored.
    pub(crate) async fn delete(
        &self,
        path: &str,
        id: &RecordId,
        session: &Session,
    ) -> Result<(), ApiError> {
        self.checked(Method::DELETE, path, Some(id), Some(session), None)
            .await
            .map(|_| ())
    }
}

fn to_json<B: Serialize + ?Sized>(payload: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::HttpClient(format!("request body: {e}")))
}

/// Parse a response body; an empty body or JSON `null` is an error.
pub(crate) fn parse_body<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::EmptyResponse);
    }
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        tracing::warn!(path, error = %e, "response is not JSON");
        ApiError::ResponseParsing(e.to_string())
    })?;
    if value.is_null() {
        return Err(ApiError::EmptyResponse);
    }
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(path, error = %e, "unexpected response shape");
        ApiError::ResponseParsing(e.to_string())
    })
}
