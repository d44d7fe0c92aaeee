//! Natural key to surrogate id map.

use quill_interface::RowId;
use std::collections::HashMap;

/// Ids the store assigned to chapters and characters.
///
/// Filled lazily. A miss means "not seen yet", never "does not exist": the
/// caller must ask the store before creating.
#[derive(Debug, Clone, Default)]
pub struct IdCache {
    chapters: HashMap<u32, RowId>,
    characters: HashMap<String, RowId>,
}

impl IdCache {
    /// Cached id of chapter `number`.
    pub fn chapter(&self, number: u32) -> Option<RowId> {
        self.chapters.get(&number).copied()
    }

    /// Remember the id of chapter `number`.
    pub fn remember_chapter(&mut self, number: u32, id: RowId) {
        self.chapters.insert(number, id);
    }

    /// Cached id of the character with `identifier`.
    pub fn character(&self, identifier: &str) -> Option<RowId> {
        self.characters.get(identifier).copied()
    }

    /// Remember the id of the character with `identifier`.
    pub fn remember_character(&mut self, identifier: &str, id: RowId) {
        self.characters.insert(identifier.to_string(), id);
    }

    /// Number of cached ids.
    pub fn len(&self) -> usize {
        self.chapters.len() + self.characters.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
