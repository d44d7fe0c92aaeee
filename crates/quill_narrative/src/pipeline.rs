//! One-call entry point for a generation run.

use crate::{NodeContext, PipelineConfig, RunSummary, WorkflowEngine};
use quill_core::{StorySeed, WorkingState};
use quill_error::QuillResult;
use quill_interface::{ContentGenerator, StoryStore};
use std::sync::Arc;

/// Final state and counters of a run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Working state after the last node
    pub state: WorkingState,
    /// Counters
    pub summary: RunSummary,
}

impl PipelineOutcome {
    /// The compiled document, if the run reached `compile`.
    pub fn document(&self) -> Option<&str> {
        self.state.compiled.as_deref()
    }
}

/// Store, generator and config for a run.
#[derive(Clone)]
pub struct StoryPipeline {
    store: Arc<dyn StoryStore>,
    generator: Arc<dyn ContentGenerator>,
    config: PipelineConfig,
}

impl std::fmt::Debug for StoryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryPipeline")
            .field("store", &self.store.backend_name())
            .field("generator", &self.generator.provider_name())
            .field("config", &self.config)
            .finish()
    }
}

impl StoryPipeline {
    /// Create a pipeline.
    pub fn new(
        store: Arc<dyn StoryStore>,
        generator: Arc<dyn ContentGenerator>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    /// Run the story graph from `seed`.
    ///
    /// If the store already holds a story, the run resumes it and the seed
    /// is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph is invalid or the step budget runs out.
    #[tracing::instrument(skip_all, fields(store = self.store.backend_name(), generator = self.generator.provider_name()))]
    pub async fn run(&self, seed: StorySeed) -> QuillResult<PipelineOutcome> {
        let context = NodeContext::new(
            Arc::clone(&self.store),
            Arc::clone(&self.generator),
            self.config.clone(),
        );
        let mut engine = WorkflowEngine::story(context)?;
        let mut state = WorkingState::from_seed(seed);
        let summary = engine.run(&mut state).await?;
        Ok(PipelineOutcome { state, summary })
    }
}
