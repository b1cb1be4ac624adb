//! Custom-key preservation across finalization
//!
//! [`StreamState::finalize`] keeps only the standard bookmark fields. The
//! merge policy snapshots the custom keys it is told to keep, finalizes, and
//! puts them back.

use super::boundary::BOUNDARY_PREFIX;
use super::types::StreamState;

/// Which custom keys survive finalization
#[derive(Debug, Clone)]
pub struct MergePolicy {
    preserved_prefixes: Vec<String>,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::new([BOUNDARY_PREFIX])
    }
}

impl MergePolicy {
    /// Keep every custom key starting with one of `prefixes`
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preserved_prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    fn preserves(&self, key: &str) -> bool {
        self.preserved_prefixes
            .iter()
            .any(|prefix| key.starts_with(prefix.as_str()))
    }

    /// Finalize `state`, keeping the preserved custom keys unchanged
    pub fn finalize(&self, state: &mut StreamState) {
        let snapshot: Vec<_> = state
            .custom
            .iter()
            .filter(|(key, _)| self.preserves(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        state.finalize();
        state.custom.extend(snapshot);
    }
}

/// Finalize with the default policy (boundary keys preserved)
pub fn finalize_preserving(state: &mut StreamState) {
    MergePolicy::default().finalize(state);
}
