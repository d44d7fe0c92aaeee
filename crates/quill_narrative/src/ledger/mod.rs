//! Queryable memory of what the story has already done.
//!
//! [`ConsistencyLedger`] sits over the ledger tables of a [`StoryStore`] and
//! gives nodes four views: used phrases, scene structures, one-time plot
//! beats and per-character knowledge. Every write is a single row-level
//! upsert; duplicates are no-ops rather than errors.

mod compliance;
mod knowledge;
mod phrases;
mod progression;
mod structure;
mod variety;

pub use compliance::check_compliance;
pub use variety::{SCENE_TYPES, VarietyInputs, compute_variety};

use quill_interface::StoryStore;
use std::sync::Arc;

/// Ledger handle over a store.
#[derive(Clone)]
pub struct ConsistencyLedger {
    store: Arc<dyn StoryStore>,
}

impl std::fmt::Debug for ConsistencyLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsistencyLedger")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

impl ConsistencyLedger {
    /// Ledger backed by `store`.
    pub fn new(store: Arc<dyn StoryStore>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &dyn StoryStore {
        self.store.as_ref()
    }
}
