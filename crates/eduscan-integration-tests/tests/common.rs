//! Common test utilities for integration tests

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use eduscan_core::{GradingProvider, MockGradingProvider};
use eduscan_observability::Metrics;
use eduscan_server::{App, ServerConfig};
use eduscan_session::{AuthConfig, SessionGate};
use eduscan_storage::FileStateStore;
use eduscan_ui::{AppState, UiConfig, build_router};
use eduscan_upload::{UploadConfig, UploadManager};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const EMAIL: &str = "teacher@eduscan.ai";
pub const PASSWORD: &str = "demo123";
pub const BOUNDARY: &str = "eduscan-integration-boundary";

/// A running server wired to a temp state file
#[allow(dead_code)]
pub struct TestApp {
    pub app: App,
    pub router: Router,
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    /// Fresh state directory, session restored
    pub async fn start() -> Self {
        Self::start_in(TempDir::new().unwrap()).await
    }

    /// Reuse `dir`, as a restart of the same installation would
    pub async fn start_in(dir: TempDir) -> Self {
        let app = App::build(fast_config(&dir)).await.unwrap();
        app.state.gate.restore_session().await;
        let router = build_router(app.state.clone());
        Self { app, router, dir }
    }

    /// Stop background work and hand back the state directory
    pub fn stop(self) -> TempDir {
        self.app.shutdown();
        self.dir
    }

    pub fn state_file(&self) -> PathBuf {
        state_file(&self.dir)
    }

    /// Current contents of the state file as a key-value map
    pub fn persisted(&self) -> BTreeMap<String, String> {
        match std::fs::read_to_string(self.state_file()) {
            Ok(content) if !content.trim().is_empty() => serde_json::from_str(&content).unwrap(),
            _ => BTreeMap::new(),
        }
    }

    pub async fn sign_in(&self) {
        let (status, headers, _) = self
            .send(form_request("/login", EMAIL, PASSWORD))
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/");
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, String) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8_lossy(&body).into_owned())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// JSON API call; a non-JSON or empty body comes back as `Value::Null`
    pub async fn api(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let (status, _, text) = self.send(builder.body(body).unwrap()).await;
        (status, serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    pub async fn upload(&self, files: &[(&str, &str, usize)]) -> (StatusCode, Value) {
        let (status, _, text) = self.send(multipart_request(files)).await;
        (status, serde_json::from_str(&text).unwrap_or(Value::Null))
    }
}

pub fn state_file(dir: &TempDir) -> PathBuf {
    dir.path().join("state.json")
}

/// Defaults with the artificial delays shortened
pub fn fast_config(dir: &TempDir) -> ServerConfig {
    let mut config = ServerConfig {
        state_file: state_file(dir).to_string_lossy().into_owned(),
        ..ServerConfig::default()
    };
    config.auth.login_delay_ms = 0;
    config.uploads.pipeline.tick_interval_ms = 5;
    config.uploads.pipeline.max_increment = 40.0;
    config.uploads.pipeline.processing_delay_ms = 20;
    config
}

/// Router whose gate has not restored yet, to observe the `Unknown` state
#[allow(dead_code)]
pub async fn unrestored_router(dir: &TempDir) -> Router {
    let store = Arc::new(FileStateStore::new(state_file(dir)).await.unwrap());
    let gate = Arc::new(SessionGate::new(AuthConfig::default(), store));
    let provider: Arc<dyn GradingProvider> = Arc::new(MockGradingProvider::new());
    let uploads = UploadManager::new(UploadConfig::default(), provider.clone()).unwrap();
    let state = AppState::new(
        gate,
        uploads,
        provider,
        Arc::new(Metrics::new().unwrap()),
        UiConfig::default(),
    )
    .await
    .unwrap();
    build_router(state)
}

pub fn form_request(uri: &str, email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "email={}&password={}",
            email.replace('@', "%40"),
            password
        )))
        .unwrap()
}

/// `(file name, content type, size)` triples as one multipart body
pub fn multipart_request(files: &[(&str, &str, usize)]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, content_type, size) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend(std::iter::repeat_n(b'x', *size));
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
