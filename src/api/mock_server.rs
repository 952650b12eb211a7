//! In-process stand-in for the REST backend, used by the client tests.
//!
//! Binds an ephemeral port on 127.0.0.1, answers every request from a
//! table of canned `(method, path) → (status, body)` replies and records
//! what it received so tests can assert on paths, ids, headers and bodies.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::sync::oneshot;

/// Path prefix the mock serves under, mirroring the real `/v1` base.
const PREFIX: &str = "/v1";

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl Recorded {
    /// Value of the `id` query parameter, if any.
    pub fn id(&self) -> Option<&str> {
        self.query
            .as_deref()?
            .split('&')
            .find_map(|pair| pair.strip_prefix("id="))
    }
}

#[derive(Default)]
struct MockState {
    replies: HashMap<(Method, String), (StatusCode, String)>,
    recorded: Vec<Recorded>,
}

type Shared = Arc<Mutex<MockState>>;

pub(crate) struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        let state: Shared = Arc::default();
        let app = Router::new().fallback(handle).with_state(state.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}{PREFIX}", self.addr)
    }

    /// Reply to `method path` with `status` and a JSON body.
    pub fn reply(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.reply_raw(method, path, status, &body.to_string());
    }

    /// Reply with an arbitrary (possibly non-JSON or empty) body.
    pub fn reply_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.state
            .lock()
            .expect("mock state")
            .replies
            .insert((method, path.to_string()), (status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().expect("mock state").recorded.clone()
    }

    pub fn single_request(&self) -> Recorded {
        let mut all = self.requests();
        assert_eq!(all.len(), 1, "expected exactly one request, got {all:?}");
        all.remove(0)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = (!body.is_empty())
        .then(|| serde_json::from_slice(&body).ok())
        .flatten();

    let mut guard = state.lock().expect("mock state");
    guard.recorded.push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization,
        body,
    });

    let (status, reply) = guard
        .replies
        .get(&(method, path))
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, r#"{"message":"no route"}"#.to_string()));
    (status, [(header::CONTENT_TYPE, "application/json")], reply).into_response()
}
