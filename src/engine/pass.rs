//! Per-pass tracking
//!
//! Everything that changes while a single stream pass runs: the boundary the
//! pass stops at, the paginator, the record buffer and the phase. A fresh
//! context is created for every pass and dropped at its end.

use super::types::PassPhase;
use crate::pagination::{CursorPaginator, NextPage, Paginator};
use crate::types::{JsonValue, Record};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::debug;

/// Mutable state of one pass over one stream
#[derive(Debug)]
pub struct PassContext {
    stream: String,
    target_boundary: Option<String>,
    paginator: CursorPaginator,
    buffer: Vec<Record>,
    phase: PassPhase,
    pages_fetched: usize,
}

impl PassContext {
    /// Start a pass for `stream`
    pub fn new(stream: impl Into<String>) -> Self {
        Self {
            stream: stream.into(),
            target_boundary: None,
            paginator: CursorPaginator::persona(),
            buffer: Vec::new(),
            phase: PassPhase::InitialPage,
            pages_fetched: 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// Boundary ID this pass stops at
    pub fn target_boundary(&self) -> Option<&str> {
        self.target_boundary.as_deref()
    }

    /// Pages absorbed so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Records buffered so far
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Leave the initial phase, remembering the first page's boundary
    pub fn begin(&mut self, target_boundary: Option<String>) {
        if self.phase == PassPhase::InitialPage {
            self.target_boundary = target_boundary;
            self.phase = PassPhase::Paging;
        }
    }

    /// Buffer a page's records in API order.
    ///
    /// The boundary record itself is kept; anything after it on the same page
    /// is dropped and pagination is stopped.
    pub fn absorb_page(&mut self, records: Vec<Record>) {
        self.pages_fetched += 1;

        for record in records {
            let is_boundary = match (&self.target_boundary, record.get("id")) {
                (Some(target), Some(JsonValue::String(id))) => id == target,
                _ => false,
            };
            self.buffer.push(record);

            if is_boundary {
                debug!(
                    stream = %self.stream,
                    boundary = ?self.target_boundary,
                    page = self.pages_fetched,
                    "Boundary record reached"
                );
                self.phase = PassPhase::BoundaryReached;
                self.paginator.signal_stop();
                break;
            }
        }
    }

    /// Cursor for the next request, or `None` when the pass is done fetching
    pub fn next_cursor(&mut self, body: &Value) -> Option<String> {
        match self.paginator.process_response(body) {
            NextPage::Continue { cursor } => Some(cursor),
            NextPage::Done { reason } => {
                if self.phase != PassPhase::BoundaryReached {
                    debug!(stream = %self.stream, ?reason, "Pagination exhausted");
                    self.phase = PassPhase::Exhausted;
                }
                None
            }
        }
    }

    /// Drain the buffer sorted ascending by `replication_key`.
    ///
    /// The sort is stable; records without a string value sort first.
    pub fn take_sorted(&mut self, replication_key: &str) -> Vec<Record> {
        let mut records = std::mem::take(&mut self.buffer);
        records.sort_by(|a, b| compare_by(a, b, replication_key));
        records
    }
}

fn compare_by(a: &Record, b: &Record, key: &str) -> Ordering {
    let a = a.get(key).and_then(JsonValue::as_str);
    let b = b.get(key).and_then(JsonValue::as_str);
    a.cmp(&b)
}
