//! Collaborators handed to every node.

use crate::{ConsistencyLedger, GeneratorAdapter, PipelineConfig};
use quill_error::GenerationFailure;
use quill_interface::{ContentGenerator, StoryStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Counters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Node executions
    pub steps: usize,
    /// Scenes accepted
    pub scenes_written: usize,
    /// Scenes accepted with outstanding issues after the revision limit
    pub forced_accepts: usize,
    /// Generator or ledger calls replaced by a fallback
    pub collaborator_failures: usize,
    /// Store writes that failed
    pub persistence_failures: usize,
}

/// Everything a node may touch besides the working state.
pub struct NodeContext {
    /// Store handle, for reads
    pub store: Arc<dyn StoryStore>,
    /// Generator handle
    pub generator: GeneratorAdapter,
    /// Ledger over the same store
    pub ledger: ConsistencyLedger,
    /// Tuning knobs
    pub config: PipelineConfig,
    /// Counters for this run
    pub summary: RunSummary,
}

impl std::fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeContext")
            .field("store", &self.store.backend_name())
            .field("generator", &self.generator)
            .field("config", &self.config)
            .field("summary", &self.summary)
            .finish()
    }
}

impl NodeContext {
    /// Context for one run over `store` and `generator`.
    ///
    /// Every generator call is capped at `config.max_tokens()` when set.
    pub fn new(
        store: Arc<dyn StoryStore>,
        generator: Arc<dyn ContentGenerator>,
        config: PipelineConfig,
    ) -> Self {
        let mut adapter = GeneratorAdapter::new(generator);
        if let Some(max_tokens) = *config.max_tokens() {
            adapter = adapter.with_max_tokens(max_tokens);
        }
        Self {
            ledger: ConsistencyLedger::new(Arc::clone(&store)),
            generator: adapter,
            store,
            config,
            summary: RunSummary::default(),
        }
    }

    /// Log a generator failure and the fallback taken.
    pub fn collaborator_failed(&mut self, failure: &GenerationFailure, fallback: &str) {
        self.summary.collaborator_failures += 1;
        tracing::warn!(error = %failure, fallback, "Generator call failed, using fallback");
    }

    /// Log a ledger failure and the fallback taken.
    pub fn ledger_failed(&mut self, error: &quill_error::QuillError, fallback: &str) {
        self.summary.collaborator_failures += 1;
        tracing::warn!(error = %error, fallback, "Ledger call failed, using fallback");
    }
}
