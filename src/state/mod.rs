//! State management module
//!
//! Handles bookmarks, the incompleteness boundary, and persistence between
//! runs.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` / `StreamState` - the persisted bookmark document
//! - `BoundaryTracker` - the oldest-incomplete-record boundary per stream
//! - `MergePolicy` - keeps boundary keys through bookmark finalization
//! - `StateManager` - file-based state persistence

mod boundary;
mod manager;
mod merge;
mod types;

pub use boundary::{BoundaryTracker, IncompleteBoundary, BOUNDARY_PREFIX};
pub use manager::StateManager;
pub use merge::{finalize_preserving, MergePolicy};
pub use types::{ProgressMarkers, State, StreamState};

#[cfg(test)]
mod manager_tests;

#[cfg(test)]
mod tests;
