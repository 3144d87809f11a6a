//! In-process mock of the Valkey HTTP service.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use valkey_http::{Client, ConfigBuilder};

pub const ACCESS_KEY: &str = "test-access-key";

/// A request as the mock server saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Raw, still percent-encoded path.
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Command name of an exec request.
    pub fn command(&self) -> Option<&str> {
        self.body.as_ref()?.get("command")?.as_str()
    }
}

/// Scripted response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Responder = Arc<dyn Fn(&Recorded) -> Reply + Send + Sync>;

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responder: Responder,
}

pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&Recorded) -> Reply + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            requests: requests.clone(),
            responder: Arc::new(responder),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    /// Mock that answers every endpoint like a healthy store would.
    pub async fn healthy() -> Self {
        Self::start(default_reply).await
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn client(&self) -> Client {
        self.client_with(|builder| builder)
    }

    pub fn client_with<F>(&self, configure: F) -> Client
    where
        F: FnOnce(ConfigBuilder) -> ConfigBuilder,
    {
        let builder = ConfigBuilder::new()
            .access_key(ACCESS_KEY)
            .base_url(&self.base_url);
        let config = configure(builder).build_with(|_| None).unwrap();
        Client::new(config).unwrap()
    }
}

pub fn default_reply(req: &Recorded) -> Reply {
    let path = req.path.as_str();
    if path == "/valkey/set" || path == "/valkey/expire" {
        Reply::ok(json!({ "success": true }))
    } else if path == "/valkey/get/missing" {
        Reply::ok(json!({ "value": null }))
    } else if path.starts_with("/valkey/get/") {
        Reply::ok(json!({ "value": "stored" }))
    } else if path.starts_with("/valkey/del/") {
        Reply::ok(json!({ "deleted": true }))
    } else if path.starts_with("/valkey/exists/") {
        Reply::ok(json!({ "exists": true }))
    } else if path.starts_with("/valkey/ttl/") {
        Reply::ok(json!({ "ttl": 120 }))
    } else if path == "/valkey/exec" {
        let command = req.command().unwrap_or_default();
        Reply::ok(json!({ "result": format!("{} OK", command) }))
    } else {
        Reply::status(404, json!({ "message": "no such endpoint" }))
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = Recorded {
        method,
        path: uri.path().to_string(),
        headers,
        body: serde_json::from_slice(&body).ok(),
    };
    let reply = (state.responder)(&recorded);
    state.requests.lock().unwrap().push(recorded);

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(reply.status).unwrap();
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}
