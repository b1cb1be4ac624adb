//! Tests for StateManager

use super::*;
use crate::error::Error;
use serde_json::json;
use tempfile::tempdir;

// ============================================================================
// Construction Tests
// ============================================================================

#[test]
fn test_state_manager_new() {
    let manager = StateManager::new("/tmp/test-state.json");
    assert!(!manager.is_in_memory());
}

#[test]
fn test_state_manager_in_memory() {
    let manager = StateManager::in_memory();
    assert!(manager.is_in_memory());
}

#[tokio::test]
async fn test_from_json() {
    let manager = StateManager::from_json(
        r#"{"bookmarks": {"cases": {"replication_key_value": "2025-01-01T00:00:00Z", "earliest_incomplete_id": "case_1"}}}"#,
    )
    .unwrap();

    let cases = manager.get_stream_state("cases").await.unwrap();
    assert_eq!(
        cases.replication_key_value.as_deref(),
        Some("2025-01-01T00:00:00Z")
    );
    assert_eq!(cases.get_custom_str("earliest_incomplete_id"), Some("case_1"));
    assert!(manager.get_stream_state("inquiries").await.is_none());
}

#[test]
fn test_from_json_invalid() {
    let err = StateManager::from_json("{not json").unwrap_err();
    assert!(err.to_string().contains("Failed to parse state JSON"));
}

#[tokio::test]
async fn test_from_json_empty_document() {
    let manager = StateManager::from_json("  ").unwrap();
    assert!(manager.snapshot().await.bookmarks.is_empty());
}

// ============================================================================
// Stream State Tests
// ============================================================================

#[tokio::test]
async fn test_set_stream_state() {
    let manager = StateManager::in_memory();

    let mut stream = StreamState::new();
    stream.replication_key_value = Some("2025-01-02T00:00:00Z".to_string());
    manager.set_stream_state("inquiries", stream.clone()).await.unwrap();

    assert_eq!(manager.get_stream_state("inquiries").await, Some(stream));
    assert!(manager.get_stream_state("cases").await.is_none());
}

#[tokio::test]
async fn test_clones_share_state() {
    let manager = StateManager::in_memory();
    let clone = manager.clone();

    clone
        .set_stream_state("cases", StreamState::new())
        .await
        .unwrap();
    assert!(manager.get_stream_state("cases").await.is_some());
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[tokio::test]
async fn test_auto_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::new(&path);
    let mut stream = StreamState::new();
    stream.replication_key = Some("updated_at".to_string());
    stream.replication_key_value = Some("2025-01-15T12:00:00Z".to_string());
    stream.set_custom("earliest_incomplete_id", json!("inq_created_1"));
    manager.set_stream_state("inquiries", stream).await.unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("tmp").exists());

    let reloaded = StateManager::from_file(&path).unwrap();
    let inquiries = reloaded.get_stream_state("inquiries").await.unwrap();
    assert_eq!(
        inquiries.get_custom_str("earliest_incomplete_id"),
        Some("inq_created_1")
    );
}

#[tokio::test]
async fn test_from_missing_file_is_empty() {
    let dir = tempdir().unwrap();
    let manager = StateManager::from_file(dir.path().join("missing.json")).unwrap();
    assert!(manager.snapshot().await.bookmarks.is_empty());
}

#[tokio::test]
async fn test_failed_save_keeps_previous_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing_dir").join("state.json");
    let manager = StateManager::new(&path);

    let mut stream = StreamState::new();
    stream.replication_key_value = Some("2025-01-02T00:00:00Z".to_string());
    stream.set_custom("earliest_incomplete_id", json!("inq_1"));

    let err = manager.set_stream_state("inquiries", stream).await.unwrap_err();
    assert!(matches!(err, Error::State { .. }));
    assert!(manager.get_stream_state("inquiries").await.is_none());
    assert!(manager.snapshot().await.bookmarks.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_all_persist() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let manager = StateManager::new(&path);

    for round in 0..50 {
        let value = format!("2025-01-01T00:00:{:02}Z", round % 60);
        let mut inquiries = StreamState::new();
        inquiries.replication_key_value = Some(value.clone());
        let mut cases = StreamState::new();
        cases.replication_key_value = Some(value);

        let (a, b) = tokio::join!(
            manager.set_stream_state("inquiries", inquiries),
            manager.set_stream_state("cases", cases),
        );
        a.unwrap();
        b.unwrap();
    }

    let reloaded = StateManager::from_file(&path).unwrap().snapshot().await;
    assert_eq!(reloaded, manager.snapshot().await);
    assert_eq!(reloaded.bookmarks.len(), 2);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("state.json")]);
}

#[tokio::test]
async fn test_save_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.json");

    let manager = StateManager::from_json(r#"{"bookmarks": {"cases": {"replication_key_value": "v"}}}"#)
        .unwrap();
    manager.save_to_file(&path).await.unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["bookmarks"]["cases"]["replication_key_value"], "v");
    assert!(manager.is_in_memory());
    assert_eq!(
        StateManager::from_file(&path).unwrap().snapshot().await,
        manager.snapshot().await
    );
}
