//! Shared helpers for tests against a mocked automation backend
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use pin_automation_client::{
    app_state::AppState,
    config::ClientConfig,
    models::credentials::Credentials,
    services::session_store::{MemorySessionStore, SessionStore},
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub fn credentials() -> Credentials {
    Credentials::new("pin-token", "mytag-20", "password123")
}

pub fn config_for(server_uri: &str) -> ClientConfig {
    ClientConfig {
        api_base_url: server_uri.to_string(),
        request_timeout_secs: 2,
        poll_interval_secs: 1,
        ..ClientConfig::default()
    }
}

/// Client wired to the mock server with an in-memory store.
pub fn logged_out_client(server: &MockServer) -> (AppState, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    let state = AppState::new(config_for(&server.uri()), store.clone()).unwrap();
    (state, store)
}

/// Client that already holds `session_id` (as if restored on startup).
pub fn logged_in_client(server: &MockServer, session_id: &str) -> (AppState, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::with_session(session_id, "blob"));
    let dyn_store: Arc<dyn SessionStore> = store.clone();
    let state = AppState::new(config_for(&server.uri()), dyn_store).unwrap();
    (state, store)
}

pub fn job_json(job_id: &str, status: &str, created_at: &str, progress: Option<f64>) -> serde_json::Value {
    let mut job = serde_json::json!({
        "job_id": job_id,
        "status": status,
        "created_at": created_at,
        "updated_at": created_at,
    });
    if let Some(p) = progress {
        job["progress"] = serde_json::json!({
            "current_category": "electronics",
            "completed_categories": 1,
            "total_categories": 4,
            "overall_progress": p,
        });
    }
    job
}

pub async fn mount_start_session(server: &MockServer, session_id: &str) {
    Mock::given(method("POST"))
        .and(path("/api/start-session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "session_id": session_id,
            "encrypted_credentials": "server-blob",
            "pinterest_boards": [{"id": "b1", "name": "Gadgets"}]
        })))
        .mount(server)
        .await;
}

pub async fn mount_jobs(server: &MockServer, jobs: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/api/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "jobs": jobs })))
        .mount(server)
        .await;
}

pub fn bearer(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn requests_to(server: &MockServer, route: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == route)
        .collect()
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Wait until the server has seen at least `count` requests to `route`.
pub async fn wait_for_requests(server: &MockServer, route: &str, count: usize, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if requests_to(server, route).await.len() >= count {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
