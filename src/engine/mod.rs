//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Runs one incremental pass per stream with state commits
//! - `PassContext` - Per-pass boundary, paginator, buffer and phase
//! - Message types for output (Schema, Record, State, Log)
//!
//! A pass pages newest-first from the API until it either runs out of pages
//! or meets the stored boundary record, then emits the buffered records in
//! ascending `updated_at` order and commits the stream's state. A failed pass
//! commits nothing.

mod pass;
mod types;

pub use pass::PassContext;
pub use types::{Message, PassPhase, StreamOutcome, StreamStats, SyncStats};

use crate::config::TapConfig;
use crate::error::Result;
use crate::http::PageSource;
use crate::state::{finalize_preserving, StateManager};
use crate::streams::{StreamStrategy, EXTRACTED_AT_FIELD, PAGE_SIZE_PARAM};
use crate::types::{JsonValue, StringMap};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Sync engine for orchestrating data extraction
#[derive(Clone)]
pub struct SyncEngine {
    /// Where pages come from
    source: Arc<dyn PageSource>,
    /// State manager
    state: StateManager,
    /// Tap configuration
    config: Arc<TapConfig>,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(source: Arc<dyn PageSource>, state: StateManager, config: TapConfig) -> Self {
        Self {
            source,
            state,
            config: Arc::new(config),
        }
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get the tap configuration
    pub fn config(&self) -> &TapConfig {
        &self.config
    }

    /// Fetch a single record to prove the credentials work
    pub async fn check_connection(&self, path: &str) -> Result<()> {
        let mut params = StringMap::new();
        params.insert(PAGE_SIZE_PARAM.to_string(), "1".to_string());
        self.source.fetch_page(path, &params).await?;
        Ok(())
    }

    /// Run one incremental pass over a stream.
    ///
    /// The stream's state is only committed once every page has been fetched
    /// and every record emitted.
    pub async fn sync_stream(&self, strategy: &dyn StreamStrategy) -> Result<StreamOutcome> {
        let start = Instant::now();
        let definition = strategy.definition();
        let name = definition.name.as_str();

        let committed = self.state.get_stream_state(name).await;
        let mut working = committed.clone().unwrap_or_default();

        let mut pass = PassContext::new(name);
        let mut messages = vec![Message::schema(definition)];
        let mut next_token: Option<String> = None;

        info!(stream = %name, "Starting sync");

        loop {
            let request =
                strategy.build_request_params(committed.as_ref(), &self.config, next_token.as_deref());
            pass.begin(request.boundary.clone());

            debug!(stream = %name, params = ?request.params, "Fetching page");
            let body = self.source.fetch_page(&definition.path, &request.params).await?;

            let records = strategy.normalize_response(&body)?;
            debug!(stream = %name, page = pass.pages_fetched() + 1, records = records.len(), "Page received");
            pass.absorb_page(records);

            match pass.next_cursor(&body) {
                Some(cursor) => next_token = Some(cursor),
                None => break,
            }
        }

        let replication_key = definition.replication_key.as_str();
        let records = pass.take_sorted(replication_key);
        let record_count = records.len();
        let mut boundary_moved = false;

        for mut record in records {
            let extracted_at = Utc::now();
            record.insert(
                EXTRACTED_AT_FIELD.to_string(),
                JsonValue::String(extracted_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
            );

            if let Some(value) = record.get(replication_key).and_then(JsonValue::as_str) {
                working.increment(replication_key, value);
            }
            boundary_moved |= strategy.update_boundary(&mut working, &record);

            messages.push(Message::record(name, record, extracted_at));
        }

        finalize_preserving(&mut working);
        self.state.set_stream_state(name, working).await?;
        messages.push(Message::state(self.state.snapshot().await));

        let stats = StreamStats {
            stream: name.to_string(),
            records: record_count,
            pages: pass.pages_fetched(),
            boundary: pass.target_boundary().map(String::from),
            phase: pass.phase(),
            boundary_moved,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            stream = %name,
            records = stats.records,
            pages = stats.pages,
            phase = ?stats.phase,
            "Completed sync"
        );

        Ok(StreamOutcome { messages, stats })
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
