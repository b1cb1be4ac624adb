//! State manager implementation
//!
//! Provides file-based state persistence with atomic writes.
//!
//! A commit reaches memory only after the file write succeeded, and writes
//! are serialized so concurrent passes never interleave on disk.

use super::types::{State, StreamState};
use crate::error::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// State manager for persisting and loading state
#[derive(Debug)]
pub struct StateManager {
    /// Path to the state file
    path: PathBuf,
    /// Current state (cached)
    state: Arc<RwLock<State>>,
    /// Held for the duration of every file write
    write_lock: Arc<Mutex<()>>,
    /// Whether to auto-save on every update
    auto_save: bool,
}

impl StateManager {
    /// Create a new state manager with the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::build(path.as_ref().to_path_buf(), State::new(), true)
    }

    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self::with_state(State::new())
    }

    /// Create an in-memory state manager seeded with `state`
    pub fn with_state(state: State) -> Self {
        Self::build(PathBuf::new(), state, false)
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            parse_state(&contents)?
        } else {
            State::new()
        };

        Ok(Self::build(path, state, true))
    }

    /// Create a state manager from inline JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::with_state(parse_state(json)?))
    }

    fn build(path: PathBuf, state: State, auto_save: bool) -> Self {
        Self {
            path,
            state: Arc::new(RwLock::new(state)),
            write_lock: Arc::new(Mutex::new(())),
            auto_save,
        }
    }

    /// Save state to a specific file path
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let state = self.state.read().await;
        self.write_file(path.as_ref(), &state).await
    }

    /// Clone of the current state
    pub async fn snapshot(&self) -> State {
        self.state.read().await.clone()
    }

    /// Get a copy of a stream's state
    pub async fn get_stream_state(&self, stream: &str) -> Option<StreamState> {
        let state = self.state.read().await;
        state.get_stream(stream).cloned()
    }

    /// Commit a stream's state.
    ///
    /// With auto-save the new document is written first; if that fails the
    /// in-memory state is left as it was.
    pub async fn set_stream_state(&self, stream: &str, stream_state: StreamState) -> Result<()> {
        let mut state = self.state.write().await;
        let mut candidate = state.clone();
        candidate.set_stream(stream, stream_state);

        if self.auto_save {
            self.write_file(&self.path, &candidate).await?;
        }

        *state = candidate;
        Ok(())
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    async fn write_file(&self, path: &Path, state: &State) -> Result<()> {
        let contents = serde_json::to_string_pretty(state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?;

        let _guard = self.write_lock.lock().await;
        write_atomic(path.to_path_buf(), contents).await
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            state: Arc::clone(&self.state),
            write_lock: Arc::clone(&self.write_lock),
            auto_save: self.auto_save,
        }
    }
}

/// Parse a state document; an empty document is an empty state
fn parse_state(contents: &str) -> Result<State> {
    if contents.trim().is_empty() {
        return Ok(State::new());
    }
    serde_json::from_str(contents)
        .map_err(|e| Error::state(format!("Failed to parse state JSON: {e}")))
}

/// Write to a uniquely named temp file next to `path`, then rename over it
async fn write_atomic(path: PathBuf, contents: String) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| Error::state(format!("Failed to create state file: {e}")))?;
        temp.write_all(contents.as_bytes())
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;
        temp.persist(&path)
            .map_err(|e| Error::state(format!("Failed to rename state file: {}", e.error)))?;
        Ok(())
    })
    .await
    .map_err(|e| Error::state(format!("State writer task failed: {e}")))?
}
