//! Incompleteness boundary tracking
//!
//! The Persona API cannot filter on "still incomplete", so every run has to
//! reach back far enough to re-read records that may still change. The
//! boundary is the oldest incomplete record seen so far; the next run pages
//! newest-first until it meets that record again.

use super::types::StreamState;
use crate::config::TapConfig;
use crate::types::{JsonValue, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Prefix shared by all boundary keys in a stream's state
pub const BOUNDARY_PREFIX: &str = "earliest_incomplete_";

const ID_KEY: &str = "earliest_incomplete_id";
const STATUS_KEY: &str = "earliest_incomplete_status";
const CREATED_AT_KEY: &str = "earliest_incomplete_created_at";
const UPDATED_AT_KEY: &str = "earliest_incomplete_updated_at";

/// The oldest incomplete record known for a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompleteBoundary {
    pub id: String,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl IncompleteBoundary {
    /// Read the boundary stored in a stream's state, if any
    pub fn from_state(state: &StreamState) -> Option<Self> {
        let id = state.get_custom_str(ID_KEY)?.to_string();
        Some(Self {
            id,
            status: state.get_custom_str(STATUS_KEY).map(String::from),
            created_at: state.get_custom_str(CREATED_AT_KEY).map(String::from),
            updated_at: state.get_custom_str(UPDATED_AT_KEY).map(String::from),
        })
    }

    /// Overwrite all four boundary keys in a stream's state
    pub fn write_to(&self, state: &mut StreamState) {
        state.set_custom(ID_KEY, JsonValue::String(self.id.clone()));
        state.set_custom(STATUS_KEY, optional_string(self.status.as_ref()));
        state.set_custom(CREATED_AT_KEY, optional_string(self.created_at.as_ref()));
        state.set_custom(UPDATED_AT_KEY, optional_string(self.updated_at.as_ref()));
    }
}

fn optional_string(value: Option<&String>) -> JsonValue {
    value.map_or(JsonValue::Null, |s| JsonValue::String(s.clone()))
}

/// Computes the starting boundary of a pass and keeps the stored one current
#[derive(Debug, Clone)]
pub struct BoundaryTracker {
    stream: String,
    incomplete_statuses: BTreeSet<String>,
}

impl BoundaryTracker {
    /// Create a tracker for a stream with its set of incomplete statuses
    pub fn new<I, S>(stream: impl Into<String>, incomplete_statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stream: stream.into(),
            incomplete_statuses: incomplete_statuses.into_iter().map(Into::into).collect(),
        }
    }

    /// Stream this tracker belongs to
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Whether a status counts as incomplete (exact match)
    pub fn is_incomplete(&self, status: &str) -> bool {
        self.incomplete_statuses.contains(status)
    }

    /// The incomplete status set
    pub fn incomplete_statuses(&self) -> impl Iterator<Item = &str> {
        self.incomplete_statuses.iter().map(String::as_str)
    }

    /// Boundary ID to stop the next pass at.
    ///
    /// The persisted boundary wins; the configured start ID only bootstraps
    /// the very first run. `None` means a full newest-first sync.
    pub fn get_starting_boundary(
        &self,
        state: Option<&StreamState>,
        config: &TapConfig,
    ) -> Option<String> {
        if let Some(boundary) = state.and_then(IncompleteBoundary::from_state) {
            debug!(stream = %self.stream, id = %boundary.id, "Using persisted boundary");
            return Some(boundary.id);
        }

        let start_id = config.start_id(&self.stream);
        if let Some(id) = &start_id {
            debug!(stream = %self.stream, %id, "Using configured start ID");
        }
        start_id
    }

    /// Move the stored boundary back to `record` if it is an older incomplete
    /// record. Returns whether the stored boundary changed.
    ///
    /// Creation timestamps are compared as strings, which orders ISO-8601
    /// values correctly only when they share one format and offset.
    pub fn update_boundary(&self, state: &mut StreamState, record: &Record) -> bool {
        let Some(status) = record.get("status").and_then(JsonValue::as_str) else {
            return false;
        };
        if !self.is_incomplete(status) {
            return false;
        }
        let Some(created_at) = record.get("created_at").and_then(JsonValue::as_str) else {
            return false;
        };
        let Some(id) = record.get("id").and_then(JsonValue::as_str) else {
            return false;
        };

        let stored = IncompleteBoundary::from_state(state);
        let is_older = match stored.as_ref().and_then(|b| b.created_at.as_deref()) {
            Some(current) => created_at < current,
            None => true,
        };
        if !is_older {
            return false;
        }

        let candidate = IncompleteBoundary {
            id: id.to_string(),
            status: Some(status.to_string()),
            created_at: Some(created_at.to_string()),
            updated_at: record
                .get("updated_at")
                .and_then(JsonValue::as_str)
                .map(String::from),
        };

        debug!(
            stream = %self.stream,
            id,
            status,
            created_at,
            "Boundary moved to older incomplete record"
        );
        candidate.write_to(state);
        true
    }
}
