//! Engine types
//!
//! Message types and statistics for the sync engine.

use crate::state::State;
use crate::streams::StreamDefinition;
use crate::types::{JsonValue, LogLevel, Record};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

/// A message emitted during sync
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Stream schema, sent before the stream's records
    Schema {
        /// Stream name
        stream: String,
        /// JSON schema of the records
        schema: JsonValue,
        /// Primary key fields
        key_properties: Vec<String>,
        /// Replication key fields
        bookmark_properties: Vec<String>,
    },
    /// A single record
    Record {
        /// Stream name
        stream: String,
        /// The flattened record
        record: Record,
        /// When the record was extracted
        time_extracted: DateTime<Utc>,
    },
    /// Full state document after a committed pass
    State(State),
    /// Log message
    Log {
        /// Log level
        level: LogLevel,
        /// Log message
        message: String,
    },
}

impl Message {
    /// Create a schema message from a stream definition
    pub fn schema(definition: &StreamDefinition) -> Self {
        Self::Schema {
            stream: definition.name.clone(),
            schema: definition.schema.to_json(),
            key_properties: definition.primary_keys.clone(),
            bookmark_properties: vec![definition.replication_key.clone()],
        }
    }

    /// Create a record message
    pub fn record(stream: impl Into<String>, record: Record, time_extracted: DateTime<Utc>) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted,
        }
    }

    /// Create a state message
    pub fn state(state: State) -> Self {
        Self::State(state)
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Create an info log
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create an error log
    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    /// The record carried by a record message
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Wire form of the message, one JSON object per output line
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Schema {
                stream,
                schema,
                key_properties,
                bookmark_properties,
            } => json!({
                "type": "SCHEMA",
                "stream": stream,
                "schema": schema,
                "key_properties": key_properties,
                "bookmark_properties": bookmark_properties,
            }),
            Self::Record {
                stream,
                record,
                time_extracted,
            } => json!({
                "type": "RECORD",
                "stream": stream,
                "record": record,
                "time_extracted": time_extracted.to_rfc3339_opts(SecondsFormat::Micros, true),
            }),
            Self::State(state) => json!({
                "type": "STATE",
                "value": state,
            }),
            Self::Log { level, message } => json!({
                "type": "LOG",
                "level": level,
                "message": message,
            }),
        }
    }
}

/// Per-pass phase of the incremental sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassPhase {
    /// No page requested yet
    InitialPage,
    /// Walking pages with cursors
    Paging,
    /// The boundary record was found; no further pages
    BoundaryReached,
    /// The API ran out of pages
    Exhausted,
}

/// Statistics for one stream pass
#[derive(Debug, Clone, Serialize)]
pub struct StreamStats {
    /// Stream name
    pub stream: String,
    /// Records emitted
    pub records: usize,
    /// Pages fetched
    pub pages: usize,
    /// Boundary the pass stopped at, if any
    pub boundary: Option<String>,
    /// How the pass ended
    pub phase: PassPhase,
    /// Whether the stored boundary moved during the pass
    pub boundary_moved: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStats {
    /// Total records synced
    pub records_synced: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Total streams synced
    pub streams_synced: usize,
    /// Errors encountered
    pub errors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Per-stream breakdown
    pub streams: Vec<StreamStats>,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finished stream pass
    pub fn add_stream(&mut self, stats: StreamStats) {
        self.records_synced += stats.records;
        self.pages_fetched += stats.pages;
        self.streams_synced += 1;
        self.streams.push(stats);
    }

    /// Add an error
    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// Overall outcome: every stream, some streams, or none succeeded
    pub fn status(&self) -> &'static str {
        match (self.streams_synced, self.errors) {
            (_, 0) => "SUCCEEDED",
            (0, _) => "FAILED",
            _ => "PARTIAL",
        }
    }

    /// Wire form of the end-of-run summary
    pub fn to_summary_json(&self) -> JsonValue {
        json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": self.status(),
                "total_records": self.records_synced,
                "total_pages": self.pages_fetched,
                "successful_streams": self.streams_synced,
                "failed_streams": self.errors,
                "duration_ms": self.duration_ms,
                "streams": self.streams,
            }
        })
    }
}

/// Result of syncing one stream
#[derive(Debug, Clone)]
pub struct StreamOutcome {
    /// Messages in emission order
    pub messages: Vec<Message>,
    /// Pass statistics
    pub stats: StreamStats,
}
