//! Search history management
//!
//! Past queries are kept most-recent-first under a single key as a JSON array.
//! Persistence is best-effort: read failures degrade to an empty history and
//! write failures are logged, never returned.

use crate::storage::KeyValueStore;

pub const HISTORY_KEY: &str = "astra-search-history";
pub const MAX_HISTORY_ITEMS: usize = 20;

pub struct SearchHistory<S> {
    store: S,
}

impl<S: KeyValueStore> SearchHistory<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored queries, most recent first.
    ///
    /// A record that fails to decode is removed so the next insert starts clean.
    pub fn read(&self) -> Vec<String> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read search history");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(error = %e, "Could not parse search history, discarding it");
                if let Err(e) = self.store.delete(HISTORY_KEY) {
                    tracing::warn!(error = %e, "Could not discard corrupted search history");
                }
                Vec::new()
            }
        }
    }

    /// Move `query` to the front, dropping case-insensitive duplicates and
    /// anything past [`MAX_HISTORY_ITEMS`]. Returns the resulting history.
    pub fn insert(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return self.read();
        }

        let query_lower = query.to_lowercase();
        let mut history = self.read();
        history.retain(|item| item.to_lowercase() != query_lower);
        history.insert(0, query.to_string());
        history.truncate(MAX_HISTORY_ITEMS);

        match serde_json::to_string(&history) {
            Ok(encoded) => {
                if let Err(e) = self.store.set(HISTORY_KEY, &encoded) {
                    tracing::warn!(error = %e, "Could not save search history");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not encode search history"),
        }

        history
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.delete(HISTORY_KEY) {
            tracing::warn!(error = %e, "Could not clear search history");
        }
    }
}
