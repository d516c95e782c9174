//! Local HTTP server standing in for Bamboo and Keycloak.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decoded `application/x-www-form-urlencoded` body.
    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(&self.body).into_owned().collect()
    }
}

struct Route {
    method: String,
    path: String,
    status: u16,
    body: Option<Value>,
    delay: Option<Duration>,
}

#[derive(Default)]
struct ServerState {
    routes: Vec<Route>,
    received: Vec<ReceivedRequest>,
}

type Shared = Arc<Mutex<ServerState>>;

/// Answers registered (method, path) pairs; anything else gets 404.
pub struct MockServer {
    pub base_url: String,
    state: Shared,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new().fallback(respond).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            task,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn on(&self, method: &str, path: &str, status: u16, body: Option<Value>) {
        self.route(method, path, status, body, None);
    }

    /// Like [`MockServer::on`] but waits `delay` before answering.
    pub fn on_slow(&self, method: &str, path: &str, status: u16, body: Value, delay: Duration) {
        self.route(method, path, status, Some(body), Some(delay));
    }

    fn route(
        &self,
        method: &str,
        path: &str,
        status: u16,
        body: Option<Value>,
        delay: Option<Duration>,
    ) {
        self.state.lock().unwrap().routes.push(Route {
            method: method.to_string(),
            path: path.to_string(),
            status,
            body,
            delay,
        });
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.lock().unwrap().received.clone()
    }

    /// The only request made to `path`.
    pub fn single(&self, method: &str, path: &str) -> ReceivedRequest {
        let matching: Vec<_> = self
            .received()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect();
        assert_eq!(matching.len(), 1, "requests to {} {}: {:?}", method, path, matching);
        matching.into_iter().next().unwrap()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (status, reply, delay) = {
        let mut state = state.lock().unwrap();
        state.received.push(ReceivedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            query,
            headers,
            body,
        });
        match state
            .routes
            .iter()
            .find(|r| r.method == method.as_str() && r.path == uri.path())
        {
            Some(route) => (route.status, route.body.clone(), route.delay),
            None => (404, None, None),
        }
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let status = StatusCode::from_u16(status).unwrap();
    match reply {
        Some(body) => (status, Json(body)).into_response(),
        None => status.into_response(),
    }
}
