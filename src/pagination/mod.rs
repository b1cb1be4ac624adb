//! Pagination module
//!
//! Persona paginates with opaque cursors carried in the `links.next` URL of
//! every response. The paginator turns each response into either the cursor
//! for the next request or a stop, and can be told to stop early by the sync
//! engine when the boundary record has been reached.

mod strategies;
mod types;

pub use strategies::{extract_query_param, CursorPaginator, NEXT_LINK_PATH, PAGE_AFTER_PARAM};
pub use types::{NextPage, PaginationState, Paginator, StopReason};
