//! Delegate table
//!
//! Maps generated identifiers to delegate records. Entries are only ever
//! added; the whole table is dropped by [`DelegateTable::clear`].

use crate::arena::RecordId;
use rustc_hash::FxHashMap;

/// Identifier → delegate record map
#[derive(Debug, Default)]
pub struct DelegateTable {
    entries: FxHashMap<String, RecordId>,
}

impl DelegateTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `delegate` under `id`
    ///
    /// Returns false and leaves the table untouched when `id` is already
    /// taken.
    pub fn register(&mut self, id: &str, delegate: RecordId) -> bool {
        if self.entries.contains_key(id) {
            return false;
        }
        self.entries.insert(id.to_string(), delegate);
        true
    }

    /// Delegate registered under `id`
    pub fn get(&self, id: &str) -> Option<RecordId> {
        self.entries.get(id).copied()
    }

    /// Whether `id` is a key
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
