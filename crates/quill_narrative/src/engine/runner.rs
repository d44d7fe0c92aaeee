//! Drives a compiled graph over working state.

use super::{CompiledGraph, NodeContext, RunSummary, Target};
use crate::{NodeName, PersistenceManager, story_graph};
use quill_core::WorkingState;
use quill_error::{QuillResult, WorkflowError, WorkflowErrorKind};
use std::sync::Arc;
use tracing::Instrument;

/// Sequential executor with a step budget.
///
/// One node runs at a time. After each node the delta is merged, the
/// affected slice of state is written to the store, and the routing table
/// picks the next node. The run ends at [`Target::End`] or fails with
/// [`WorkflowErrorKind::StepBudgetExceeded`] once `max_steps` nodes have run.
#[derive(Debug)]
pub struct WorkflowEngine {
    graph: CompiledGraph,
    context: NodeContext,
    persistence: PersistenceManager,
}

impl WorkflowEngine {
    /// Engine over `graph`, writing through the context's store.
    pub fn new(graph: CompiledGraph, context: NodeContext) -> Self {
        Self {
            persistence: PersistenceManager::new(Arc::clone(&context.store)),
            graph,
            context,
        }
    }

    /// Engine over the standard story graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph fails validation.
    pub fn story(context: NodeContext) -> QuillResult<Self> {
        let graph = story_graph(&context.config)?;
        Ok(Self::new(graph, context))
    }

    /// Counters so far.
    pub fn summary(&self) -> &RunSummary {
        &self.context.summary
    }

    /// Run from the entry node until the graph ends.
    ///
    /// # Errors
    ///
    /// Only [`WorkflowErrorKind::StepBudgetExceeded`] in practice; node and
    /// store failures are contained and counted in the summary.
    #[tracing::instrument(skip_all, fields(max_steps = self.context.config.max_steps()))]
    pub async fn run(&mut self, state: &mut WorkingState) -> QuillResult<RunSummary> {
        let limit = *self.context.config.max_steps();
        let mut current = self.graph.entry();
        let mut last: Option<NodeName> = None;
        let mut steps = 0usize;

        tracing::info!(
            entry = %current,
            generator = %self.context.generator.describe(),
            "Starting workflow"
        );
        loop {
            if steps >= limit {
                let last_node = last.map_or_else(|| "none".to_string(), |n| n.to_string());
                tracing::error!(limit, last_node = %last_node, "Step budget exceeded, aborting run");
                self.context.summary.steps = steps;
                return Err(WorkflowError::new(WorkflowErrorKind::StepBudgetExceeded {
                    limit,
                    last_node,
                })
                .into());
            }
            steps += 1;

            let node = self.graph.node(current)?;
            let span = tracing::info_span!(
                "node",
                node = %current,
                step = steps,
                chapter = state.cursor.chapter,
                scene = state.cursor.scene
            );
            let delta = node.run(state, &mut self.context).instrument(span).await;
            tracing::debug!(node = %current, delta = delta.name(), "Node finished");
            state.apply(delta);

            self.context.summary.persistence_failures +=
                self.persistence.save_node_state(current, state).await;

            last = Some(current);
            match self.graph.next(current, state)? {
                Target::Node(next) => current = next,
                Target::End => break,
            }
        }

        self.context.summary.steps = steps;
        tracing::info!(
            steps,
            scenes_written = self.context.summary.scenes_written,
            forced_accepts = self.context.summary.forced_accepts,
            collaborator_failures = self.context.summary.collaborator_failures,
            persistence_failures = self.context.summary.persistence_failures,
            "Workflow complete"
        );
        Ok(self.context.summary)
    }
}
