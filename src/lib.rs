// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Persona Tap
//!
//! Incremental extraction of inquiries and cases from the Persona
//! identity-verification API.
//!
//! ## Features
//!
//! - **Cursor Pagination**: Follows `links.next` / `page[after]` newest-first
//! - **Incomplete-Record Boundary**: Remembers the oldest record that was still
//!   in progress and re-reads everything newer than it on the next run
//! - **Flat Records**: JSON:API resources flattened with underscored attribute names
//! - **Durable State**: Bookmarks and boundaries committed once per successful pass
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use persona_tap::{JsonApiStream, PersonaClient, StateManager, SyncEngine, TapConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> persona_tap::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let client = PersonaClient::new(&config)?;
//!     let state = StateManager::from_file("state.json")?;
//!     let engine = SyncEngine::new(Arc::new(client), state, config.clone());
//!
//!     for stream in JsonApiStream::all(&config) {
//!         let outcome = engine.sync_stream(&stream).await?;
//!         for message in outcome.messages {
//!             println!("{}", message.to_json());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          CLI Runner                             │
//! │        check → status    discover → catalog    read → messages  │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   HTTP   │ Paginate  │    Decode     │  Streams  │    State    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Bearer   │ links.next│ JSON:API      │ Inquiries │ Bookmarks   │
//! │ Retry    │ page[after│ flattening    │ Cases     │ Boundaries  │
//! │ Backoff  │ Stop      │               │ Schemas   │ Merge policy│
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration
pub mod config;

/// HTTP client with retry and rate limiting
pub mod http;

/// Cursor pagination
pub mod pagination;

/// JSON:API response flattening
pub mod decode;

/// Stream state, bookmarks and incomplete-record boundaries
pub mod state;

/// JSON schemas for emitted records
pub mod schema;

/// Resource streams and their request strategies
pub mod streams;

/// Main execution engine
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::TapConfig;
pub use engine::{Message, SyncEngine, SyncStats};
pub use http::{PageSource, PersonaClient};
pub use state::{State, StateManager, StreamState};
pub use streams::{JsonApiStream, StreamDefinition, StreamStrategy};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
