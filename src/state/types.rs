//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs. The
//! document shape is `{"bookmarks": {"<stream>": {...}}}`.

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete state for the tap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.bookmarks.get(stream)
    }

    /// Get mutable state for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamState {
        self.bookmarks.entry(stream.to_string()).or_default()
    }

    /// Replace the state of a stream
    pub fn set_stream(&mut self, stream: &str, stream_state: StreamState) {
        self.bookmarks.insert(stream.to_string(), stream_state);
    }
}

/// Progress recorded while a pass is still running
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMarkers {
    /// Replication key being tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
    /// Highest replication value seen so far in this pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<String>,
}

/// State for a single stream.
///
/// `replication_key`, `replication_key_value` and `progress_markers` are the
/// standard bookmark fields. Everything else lands in `custom` and is dropped
/// by [`StreamState::finalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamState {
    /// Field the bookmark refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// Highest replication value among committed records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key_value: Option<String>,

    /// In-flight progress, promoted on finalize
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_markers: Option<ProgressMarkers>,

    /// Non-standard keys
    #[serde(flatten)]
    pub custom: JsonObject,
}

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a record with this replication value was emitted.
    ///
    /// Only ever moves the in-flight marker forward (string comparison).
    pub fn increment(&mut self, replication_key: &str, value: &str) {
        let markers = self.progress_markers.get_or_insert_with(ProgressMarkers::default);
        markers.replication_key = Some(replication_key.to_string());

        let advance = markers
            .replication_key_value
            .as_deref()
            .map_or(true, |current| value > current);
        if advance {
            markers.replication_key_value = Some(value.to_string());
        }
    }

    /// Generic end-of-pass finalization.
    ///
    /// Promotes the progress marker into `replication_key_value` (never
    /// moving it backwards), clears the markers and drops every custom key.
    pub fn finalize(&mut self) {
        if let Some(markers) = self.progress_markers.take() {
            if let Some(key) = markers.replication_key {
                self.replication_key = Some(key);
            }
            if let Some(value) = markers.replication_key_value {
                let advance = self
                    .replication_key_value
                    .as_deref()
                    .map_or(true, |current| value.as_str() > current);
                if advance {
                    self.replication_key_value = Some(value);
                }
            }
        }
        self.custom.clear();
    }

    /// Get a custom key
    pub fn get_custom(&self, key: &str) -> Option<&JsonValue> {
        self.custom.get(key)
    }

    /// Get a custom key as a string
    pub fn get_custom_str(&self, key: &str) -> Option<&str> {
        self.custom.get(key).and_then(JsonValue::as_str)
    }

    /// Set a custom key
    pub fn set_custom(&mut self, key: impl Into<String>, value: JsonValue) {
        self.custom.insert(key.into(), value);
    }
}
