//! Test utilities: a recording stub backend and a recording console.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tokio::net::TcpListener;

use admin_console::console::{Console, MessageKind, Modal, Panel};
use admin_console::view::UserRow;
use admin_console::{AdminClient, ApiClient, Timings};

/// A request as seen by the stub backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Value,
    pub cookie: Option<String>,
}

#[derive(Debug, Clone)]
struct StubResponse {
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
    set_cookie: Option<String>,
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responses: Arc<Mutex<HashMap<(Method, String), StubResponse>>>,
}

/// An HTTP server on an ephemeral port that answers from a table of canned
/// responses and records every request it receives.
pub struct StubBackend {
    pub origin: String,
    state: StubState,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state = StubState::default();
        let app = Router::new().fallback(record).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let stub = Self {
            origin: format!("http://{addr}"),
            state,
        };
        stub.respond(Method::GET, "/api/users", StatusCode::OK, serde_json::json!([]));
        stub
    }

    /// Answer `method path` with a JSON body.
    pub fn respond(&self, method: Method, path: &str, status: StatusCode, body: Value) {
        self.insert(
            method,
            path,
            StubResponse {
                status,
                content_type: "application/json",
                body: serde_json::to_vec(&body).unwrap(),
                set_cookie: None,
            },
        );
    }

    /// Answer `method path` with raw bytes.
    pub fn respond_raw(&self, method: Method, path: &str, status: StatusCode, body: &[u8]) {
        self.insert(
            method,
            path,
            StubResponse {
                status,
                content_type: "application/json",
                body: body.to_vec(),
                set_cookie: None,
            },
        );
    }

    /// Answer `method path` with a JSON body and a `Set-Cookie` header.
    pub fn respond_with_cookie(
        &self,
        method: Method,
        path: &str,
        body: Value,
        cookie: &str,
    ) {
        self.insert(
            method,
            path,
            StubResponse {
                status: StatusCode::OK,
                content_type: "application/json",
                body: serde_json::to_vec(&body).unwrap(),
                set_cookie: Some(cookie.to_string()),
            },
        );
    }

    fn insert(&self, method: Method, path: &str, response: StubResponse) {
        self.state
            .responses
            .lock()
            .unwrap()
            .insert((method, path.to_string()), response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests matching `method path`.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.origin, "/api", Duration::from_secs(5)).unwrap()
    }

    pub fn client(&self) -> AdminClient<RecordingConsole> {
        self.client_with(RecordingConsole::confirming(true))
    }

    pub fn client_with(&self, console: RecordingConsole) -> AdminClient<RecordingConsole> {
        AdminClient::new(self.api(), console).with_timings(Timings::immediate())
    }
}

async fn record(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let parsed = serde_json::from_slice(&body).unwrap_or(Value::Null);

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: parsed,
        cookie,
    });

    let canned = state
        .responses
        .lock()
        .unwrap()
        .get(&(method, path))
        .cloned();

    match canned {
        Some(stub) => {
            let mut response =
                (stub.status, [(header::CONTENT_TYPE, stub.content_type)], stub.body)
                    .into_response();
            if let Some(cookie) = stub.set_cookie {
                response
                    .headers_mut()
                    .insert(header::SET_COOKIE, cookie.parse().unwrap());
            }
            response
        }
        None => (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"success":false,"message":"not stubbed"}"#,
        )
            .into_response(),
    }
}

/// Address nothing listens on.
pub async fn closed_origin() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Console double that records everything rendered onto it.
#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub confirm_answer: bool,
    pub messages: Vec<(MessageKind, String)>,
    pub alerts: Vec<String>,
    pub prompts: Vec<String>,
    pub redirects: Vec<String>,
    pub tables: Vec<Vec<UserRow>>,
    pub downloads: Vec<(String, Vec<u8>)>,
    pub panels: Vec<Panel>,
    pub modals: Vec<(Modal, bool)>,
    pub cleared: usize,
}

impl RecordingConsole {
    pub fn confirming(answer: bool) -> Self {
        Self {
            confirm_answer: answer,
            ..Self::default()
        }
    }

    pub fn last_message(&self) -> Option<&(MessageKind, String)> {
        self.messages.last()
    }
}

impl Console for RecordingConsole {
    fn show_message(&mut self, kind: MessageKind, text: &str) {
        self.messages.push((kind, text.to_string()));
    }

    fn alert(&mut self, text: &str) {
        self.alerts.push(text.to_string());
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.confirm_answer
    }

    fn redirect(&mut self, path: &str) {
        self.redirects.push(path.to_string());
    }

    fn render_users(&mut self, rows: &[UserRow]) {
        self.tables.push(rows.to_vec());
    }

    fn download(&mut self, file_name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        self.downloads
            .push((file_name.to_string(), contents.to_vec()));
        Ok(PathBuf::from(file_name))
    }

    fn clear_message(&mut self) {
        self.cleared += 1;
    }

    fn show_panel(&mut self, panel: Panel) {
        self.panels.push(panel);
    }

    fn set_modal(&mut self, modal: Modal, visible: bool) {
        self.modals.push((modal, visible));
    }
}
