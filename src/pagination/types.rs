//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by the paginator.

use serde_json::Value;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available behind this cursor
    Continue {
        /// Opaque cursor for the next request
        cursor: String,
    },
    /// No more pages
    Done {
        /// Why pagination ended
        reason: StopReason,
    },
}

impl NextPage {
    /// Create a continuation
    pub fn with_cursor(cursor: impl Into<String>) -> Self {
        Self::Continue {
            cursor: cursor.into(),
        }
    }

    /// Create a done result
    pub fn done(reason: StopReason) -> Self {
        Self::Done { reason }
    }

    /// The cursor, if pagination continues
    pub fn into_cursor(self) -> Option<String> {
        match self {
            Self::Continue { cursor } => Some(cursor),
            Self::Done { .. } => None,
        }
    }
}

/// Why a paginator stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The response carried no next link
    NoNextLink,
    /// A next link was present but had no usable cursor
    MalformedNextLink,
    /// The caller asked pagination to stop
    Signaled,
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages processed so far
    pub page: u32,
    /// Most recent cursor handed out
    pub cursor: Option<String>,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Increment page number
    pub fn next_page(&mut self) {
        self.page += 1;
    }

    /// Set cursor
    pub fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// Process a response body and determine if there's a next page
    fn process_response(&mut self, body: &Value) -> NextPage;

    /// Ask pagination to stop after the current page. Sticky.
    fn signal_stop(&mut self);

    /// Current pagination state
    fn state(&self) -> &PaginationState;

    /// Next cursor, or `None` when pagination should end
    fn get_next(&mut self, body: &Value) -> Option<String> {
        self.process_response(body).into_cursor()
    }
}

/// Extract a string from a dot-separated path
pub(crate) fn extract_path_str<'a>(value: &'a Value, path: &str) -> Option<&'a str> {
    let path = path.strip_prefix("$.").unwrap_or(path);

    let mut current = value;
    for part in path.split('.') {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            _ => return None,
        }
    }

    current.as_str()
}
