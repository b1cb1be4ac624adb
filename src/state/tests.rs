//! Tests for the boundary tracker and merge policy

use super::*;
use crate::config::TapConfig;
use crate::types::Record;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn inquiry_tracker() -> BoundaryTracker {
    BoundaryTracker::new("inquiries", ["created", "pending"])
}

// ============================================================================
// Starting Boundary Tests
// ============================================================================

#[test]
fn test_starting_boundary_prefers_persisted_state() {
    let tracker = inquiry_tracker();
    let mut config = TapConfig::new("k");
    config.start_inquiry_id = Some("inq_from_config".to_string());

    let mut state = StreamState::new();
    state.set_custom("earliest_incomplete_id", json!("inq_from_state"));

    assert_eq!(
        tracker.get_starting_boundary(Some(&state), &config).as_deref(),
        Some("inq_from_state")
    );
}

#[test]
fn test_starting_boundary_falls_back_to_config() {
    let tracker = inquiry_tracker();
    let mut config = TapConfig::new("k");
    config.inquiries.start_id = Some("inq_from_config".to_string());

    assert_eq!(
        tracker.get_starting_boundary(None, &config).as_deref(),
        Some("inq_from_config")
    );
    // A state without a boundary does not hide the config value
    let state = StreamState::new();
    assert_eq!(
        tracker.get_starting_boundary(Some(&state), &config).as_deref(),
        Some("inq_from_config")
    );
}

#[test]
fn test_starting_boundary_none() {
    let tracker = BoundaryTracker::new("cases", ["Open"]);
    let mut config = TapConfig::new("k");
    // Start IDs of the other resource are not picked up
    config.start_inquiry_id = Some("inq_1".to_string());

    assert_eq!(tracker.get_starting_boundary(None, &config), None);
}

// ============================================================================
// Update Boundary Tests
// ============================================================================

#[test]
fn test_update_boundary_first_incomplete_record() {
    let tracker = inquiry_tracker();
    let mut state = StreamState::new();

    let moved = tracker.update_boundary(
        &mut state,
        &record(json!({
            "id": "inq_x",
            "status": "created",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-02T00:00:00Z"
        })),
    );

    assert!(moved);
    assert_eq!(
        IncompleteBoundary::from_state(&state),
        Some(IncompleteBoundary {
            id: "inq_x".to_string(),
            status: Some("created".to_string()),
            created_at: Some("2025-01-01T00:00:00Z".to_string()),
            updated_at: Some("2025-01-02T00:00:00Z".to_string()),
        })
    );
}

#[test]
fn test_update_boundary_only_moves_to_older_records() {
    let tracker = inquiry_tracker();
    let mut state = StreamState::new();

    tracker.update_boundary(
        &mut state,
        &record(json!({"id": "inq_mid", "status": "pending", "created_at": "2025-01-05T00:00:00Z"})),
    );

    let newer = record(json!({"id": "inq_new", "status": "created", "created_at": "2025-01-09T00:00:00Z"}));
    assert!(!tracker.update_boundary(&mut state, &newer));
    assert_eq!(state.get_custom_str("earliest_incomplete_id"), Some("inq_mid"));

    let older = record(json!({"id": "inq_old", "status": "created", "created_at": "2024-12-15T08:00:00Z"}));
    assert!(tracker.update_boundary(&mut state, &older));
    assert_eq!(state.get_custom_str("earliest_incomplete_id"), Some("inq_old"));
    assert_eq!(state.get_custom("earliest_incomplete_updated_at"), Some(&Value::Null));
}

#[test]
fn test_update_boundary_ignores_complete_and_partial_records() {
    let tracker = inquiry_tracker();
    let mut state = StreamState::new();

    let candidates = [
        json!({"id": "inq_1", "status": "completed", "created_at": "2020-01-01T00:00:00Z"}),
        json!({"id": "inq_2", "status": "created"}),
        json!({"id": "inq_3", "created_at": "2020-01-01T00:00:00Z"}),
        json!({"id": "inq_4", "status": "Created", "created_at": "2020-01-01T00:00:00Z"}),
        json!({"status": "created", "created_at": "2020-01-01T00:00:00Z"}),
    ];
    for candidate in candidates {
        assert!(!tracker.update_boundary(&mut state, &record(candidate)));
    }
    assert!(IncompleteBoundary::from_state(&state).is_none());
}

#[test]
fn test_update_boundary_is_idempotent() {
    let tracker = inquiry_tracker();
    let mut state = StreamState::new();
    let candidate = record(json!({
        "id": "inq_x",
        "status": "created",
        "created_at": "2025-01-01T00:00:00Z",
        "updated_at": "2025-01-01T00:00:00Z"
    }));

    assert!(tracker.update_boundary(&mut state, &candidate));
    let after_first = state.clone();

    assert!(!tracker.update_boundary(&mut state, &candidate));
    assert_eq!(state, after_first);
}

#[test]
fn test_resolved_record_keeps_its_boundary() {
    let tracker = inquiry_tracker();
    let mut state = StreamState::new();
    tracker.update_boundary(
        &mut state,
        &record(json!({"id": "inq_x", "status": "created", "created_at": "2025-01-01T00:00:00Z"})),
    );

    let resolved = record(json!({"id": "inq_x", "status": "completed", "created_at": "2025-01-01T00:00:00Z"}));
    assert!(!tracker.update_boundary(&mut state, &resolved));
    assert_eq!(
        state.get_custom_str("earliest_incomplete_status"),
        Some("created")
    );
}

#[test]
fn test_boundary_without_created_at_is_replaced() {
    let tracker = inquiry_tracker();
    let mut state = StreamState::new();
    state.set_custom("earliest_incomplete_id", json!("inq_hand_edited"));

    assert!(tracker.update_boundary(
        &mut state,
        &record(json!({"id": "inq_y", "status": "pending", "created_at": "2025-03-01T00:00:00Z"})),
    ));
    assert_eq!(state.get_custom_str("earliest_incomplete_id"), Some("inq_y"));
}

// ============================================================================
// Merge Policy Tests
// ============================================================================

#[test]
fn test_merge_policy_preserves_boundary_keys() {
    let mut state = StreamState::new();
    state.increment("updated_at", "2025-01-18T16:00:00Z");
    state.set_custom("earliest_incomplete_id", json!("case_open_1"));
    state.set_custom("earliest_incomplete_status", json!("Open"));
    state.set_custom("earliest_incomplete_created_at", json!("2024-11-10T09:00:00Z"));
    state.set_custom("earliest_incomplete_updated_at", json!("2025-01-12T14:00:00Z"));
    state.set_custom("scratch", json!(true));
    let custom_before = state.custom.clone();

    finalize_preserving(&mut state);

    assert_eq!(
        state.replication_key_value.as_deref(),
        Some("2025-01-18T16:00:00Z")
    );
    assert!(state.progress_markers.is_none());
    assert!(state.get_custom("scratch").is_none());
    for (key, value) in custom_before.iter().filter(|(k, _)| k.starts_with(BOUNDARY_PREFIX)) {
        assert_eq!(state.get_custom(key), Some(value));
    }
}

#[test]
fn test_merge_policy_is_idempotent() {
    let mut state = StreamState::new();
    state.increment("updated_at", "2025-01-10T00:00:00Z");
    state.set_custom("earliest_incomplete_id", json!("inq_1"));

    finalize_preserving(&mut state);
    let once = state.clone();
    finalize_preserving(&mut state);

    assert_eq!(state, once);
}

#[test]
fn test_merge_policy_custom_prefixes() {
    let mut state = StreamState::new();
    state.set_custom("earliest_incomplete_id", json!("inq_1"));
    state.set_custom("keep_me", json!(1));

    MergePolicy::new(["keep_"]).finalize(&mut state);

    assert!(state.get_custom("earliest_incomplete_id").is_none());
    assert_eq!(state.get_custom("keep_me"), Some(&json!(1)));
}
