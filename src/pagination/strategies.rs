//! Pagination strategy implementations

use super::types::{extract_path_str, NextPage, PaginationState, Paginator, StopReason};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

/// Query parameter carrying the Persona page cursor
pub const PAGE_AFTER_PARAM: &str = "page[after]";

/// Location of the next-page link in a Persona response
pub const NEXT_LINK_PATH: &str = "links.next";

// ============================================================================
// Cursor Pagination
// ============================================================================

/// Cursor pagination driven by a next-page link in the response body.
///
/// The cursor is not read from the body directly: the next link is parsed and
/// the cursor is taken from its query string. Common pattern:
/// `{"links": {"next": "/api/v1/inquiries?page[after]=inq_abc"}}`
///
/// A paginator belongs to one sync pass. Once [`Paginator::signal_stop`] has
/// been called it keeps returning `Done` for the rest of that pass.
#[derive(Debug, Clone)]
pub struct CursorPaginator {
    /// Query parameter holding the cursor in the next link
    pub cursor_param: String,
    /// Dot path to the next link in the response body
    pub next_link_path: String,
    state: PaginationState,
    stop_signaled: bool,
}

impl Default for CursorPaginator {
    fn default() -> Self {
        Self::new(PAGE_AFTER_PARAM, NEXT_LINK_PATH)
    }
}

impl CursorPaginator {
    /// Create a new cursor paginator
    pub fn new(cursor_param: impl Into<String>, next_link_path: impl Into<String>) -> Self {
        Self {
            cursor_param: cursor_param.into(),
            next_link_path: next_link_path.into(),
            state: PaginationState::new(),
            stop_signaled: false,
        }
    }

    /// Paginator for Persona's JSON:API `links.next` / `page[after]` scheme
    pub fn persona() -> Self {
        Self::default()
    }

    fn finish(&mut self, reason: StopReason) -> NextPage {
        self.state.mark_done();
        NextPage::done(reason)
    }
}

impl Paginator for CursorPaginator {
    fn process_response(&mut self, body: &Value) -> NextPage {
        self.state.next_page();

        if self.stop_signaled {
            return self.finish(StopReason::Signaled);
        }

        let Some(next_url) = extract_path_str(body, &self.next_link_path) else {
            return self.finish(StopReason::NoNextLink);
        };
        if next_url.is_empty() {
            return self.finish(StopReason::NoNextLink);
        }

        match extract_query_param(next_url, &self.cursor_param) {
            Some(cursor) => {
                debug!(page = self.state.page, %cursor, "Next page cursor");
                self.state.set_cursor(cursor.clone());
                NextPage::with_cursor(cursor)
            }
            None => {
                warn!(
                    next_url,
                    param = %self.cursor_param,
                    "Next link has no usable cursor, stopping pagination"
                );
                self.finish(StopReason::MalformedNextLink)
            }
        }
    }

    fn signal_stop(&mut self) {
        self.stop_signaled = true;
    }

    fn state(&self) -> &PaginationState {
        &self.state
    }
}

/// Read a query parameter from an absolute or relative URL.
///
/// Returns `None` for unparseable URLs, a missing parameter, or an empty value.
pub fn extract_query_param(link: &str, param: &str) -> Option<String> {
    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("http://localhost/").ok()?.join(link).ok()?
        }
        Err(_) => return None,
    };

    url.query_pairs()
        .find(|(key, _)| key == param)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
