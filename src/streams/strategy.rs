//! Per-collection sync strategy
//!
//! A strategy knows how to build the query for a page, how to turn a page
//! into records, and how a record moves the incompleteness boundary. It holds
//! no per-pass state; everything that changes during a pass lives in the
//! engine's pass context.

use super::definition::StreamDefinition;
use crate::config::TapConfig;
use crate::decode::ResponseNormalizer;
use crate::error::Result;
use crate::pagination::PAGE_AFTER_PARAM;
use crate::state::{BoundaryTracker, StreamState};
use crate::types::{Record, StringMap};
use serde_json::Value;
use tracing::debug;

/// Query parameter bounding the first page at the boundary record
pub const PAGE_BEFORE_PARAM: &str = "page[before]";

/// Query parameter for the page size
pub const PAGE_SIZE_PARAM: &str = "page[size]";

/// Parameters for one page request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Query parameters
    pub params: StringMap,
    /// Boundary ID the pass should stop at, set only on a first page
    pub boundary: Option<String>,
}

impl PageRequest {
    /// Get a query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Behaviour of one resource collection
pub trait StreamStrategy: Send + Sync {
    /// Static description of the stream
    fn definition(&self) -> &StreamDefinition;

    /// Stream name
    fn name(&self) -> &str {
        &self.definition().name
    }

    /// Build the query for the next page.
    ///
    /// `next_page_token` is the cursor of a page after the first (or of a
    /// resumed pass); it suppresses every first-page filter.
    fn build_request_params(
        &self,
        state: Option<&StreamState>,
        config: &TapConfig,
        next_page_token: Option<&str>,
    ) -> PageRequest;

    /// Flatten a response page, in API order
    fn normalize_response(&self, body: &Value) -> Result<Vec<Record>>;

    /// Let an emitted record move the stored boundary
    fn update_boundary(&self, state: &mut StreamState, record: &Record) -> bool;
}

/// Strategy for Persona's JSON:API collections
#[derive(Debug, Clone)]
pub struct JsonApiStream {
    definition: StreamDefinition,
    normalizer: ResponseNormalizer,
    tracker: BoundaryTracker,
}

impl JsonApiStream {
    /// Create a strategy from a definition as-is
    pub fn new(definition: StreamDefinition) -> Self {
        let tracker = BoundaryTracker::new(
            definition.name.clone(),
            definition.incomplete_statuses.iter().cloned(),
        );
        Self {
            definition,
            normalizer: ResponseNormalizer::new(),
            tracker,
        }
    }

    /// Create a strategy applying the config's status overrides
    pub fn configured(definition: StreamDefinition, config: &TapConfig) -> Self {
        let definition = match config.incomplete_statuses(&definition.name) {
            Some(statuses) => definition.with_incomplete_statuses(statuses),
            None => definition,
        };
        Self::new(definition)
    }

    /// Strategies for every supported stream
    pub fn all(config: &TapConfig) -> Vec<Self> {
        StreamDefinition::all()
            .into_iter()
            .map(|definition| Self::configured(definition, config))
            .collect()
    }

    /// The boundary tracker of this stream
    pub fn tracker(&self) -> &BoundaryTracker {
        &self.tracker
    }
}

impl StreamStrategy for JsonApiStream {
    fn definition(&self) -> &StreamDefinition {
        &self.definition
    }

    fn build_request_params(
        &self,
        state: Option<&StreamState>,
        config: &TapConfig,
        next_page_token: Option<&str>,
    ) -> PageRequest {
        let mut request = PageRequest::default();
        request
            .params
            .insert(PAGE_SIZE_PARAM.to_string(), config.page_size.to_string());

        if let Some(cursor) = next_page_token {
            request
                .params
                .insert(PAGE_AFTER_PARAM.to_string(), cursor.to_string());
            return request;
        }

        if let Some(boundary) = self.tracker.get_starting_boundary(state, config) {
            request
                .params
                .insert(PAGE_BEFORE_PARAM.to_string(), boundary.clone());
            request.boundary = Some(boundary);
            return request;
        }

        let start = state
            .and_then(|s| s.replication_key_value.clone())
            .or_else(|| config.start_date.clone());
        if let Some(start) = start {
            debug!(stream = %self.definition.name, %start, "No boundary, filtering by replication key");
            request
                .params
                .insert(self.definition.start_filter_param(), start);
        }

        request
    }

    fn normalize_response(&self, body: &Value) -> Result<Vec<Record>> {
        self.normalizer.normalize(body)
    }

    fn update_boundary(&self, state: &mut StreamState, record: &Record) -> bool {
        self.tracker.update_boundary(state, record)
    }
}
