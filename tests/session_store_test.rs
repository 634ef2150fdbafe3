//! File-backed session store and startup restore.

use std::sync::Arc;

use pin_automation_client::{
    app_state::AppState,
    config::ClientConfig,
    services::session_store::{FileSessionStore, SessionStore, StoreError},
};
use tempfile::TempDir;

#[test]
fn file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("session.json");

    FileSessionStore::new(&path).put("sess-1", "blob").unwrap();

    let reopened = FileSessionStore::new(&path);
    let stored = reopened.get().unwrap().unwrap();
    assert_eq!(stored.session_id, "sess-1");
    assert_eq!(stored.encrypted_credentials, "blob");
}

#[test]
fn file_store_persists_both_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    FileSessionStore::new(&path).put("sess-1", "blob").unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["session_id"], "sess-1");
    assert_eq!(raw["encrypted_credentials"], "blob");
}

#[test]
fn clear_removes_document_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().join("session.json"));

    store.put("sess-1", "blob").unwrap();
    store.clear().unwrap();
    assert!(store.get().unwrap().is_none());
    assert!(!store.path().exists());
    store.clear().unwrap();
}

#[test]
fn half_written_document_counts_as_absent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, r#"{"session_id": "sess-1"}"#).unwrap();

    assert!(FileSessionStore::new(&path).get().unwrap().is_none());
}

#[test]
fn malformed_document_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json").unwrap();

    assert!(matches!(
        FileSessionStore::new(&path).get(),
        Err(StoreError::Serialize(_))
    ));
}

#[test]
fn client_restores_persisted_session_on_startup() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    FileSessionStore::new(&path).put("sess-1", "blob").unwrap();

    let config = ClientConfig {
        session_store_path: path.clone(),
        ..ClientConfig::default()
    };
    let state = AppState::from_config(config).unwrap();
    assert!(state.api.is_authenticated());
    assert_eq!(state.session.session_id().as_deref(), Some("sess-1"));

    state.session.invalidate();
    assert!(!path.exists());
}

#[test]
fn corrupt_store_starts_logged_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{").unwrap();

    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&path));
    let state = AppState::new(ClientConfig::default(), store).unwrap();
    assert!(!state.api.is_authenticated());
}
