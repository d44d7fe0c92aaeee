//! Resumable long-form narrative pipeline.
//!
//! This crate is the core of Quill:
//!
//! - [`WorkflowEngine`] runs a [`CompiledGraph`] of [`Node`]s one at a time,
//!   merging each node's [`StateDelta`](quill_core::StateDelta) and stopping
//!   with a typed error if the step budget runs out.
//! - [`PersistenceManager`] writes the slice of state each node changed,
//!   idempotently, and counts failed writes instead of aborting.
//! - [`ConsistencyLedger`] remembers used phrases, scene structures,
//!   one-time beats and character knowledge so later scenes do not repeat
//!   earlier ones.
//!
//! # Example
//!
//! ```no_run
//! use quill_core::StorySeed;
//! use quill_narrative::{InMemoryStoryStore, PipelineConfig, StoryPipeline};
//! # use quill_interface::ContentGenerator;
//! # use std::sync::Arc;
//! # async fn demo(generator: Arc<dyn ContentGenerator>) -> quill_error::QuillResult<()> {
//! let seed = StorySeed::builder()
//!     .genre("mystery")
//!     .tone("wry")
//!     .premise("A lighthouse keeper finds a letter addressed to her future self.")
//!     .build()
//!     .unwrap();
//! let pipeline = StoryPipeline::new(
//!     Arc::new(InMemoryStoryStore::new()),
//!     generator,
//!     PipelineConfig::default(),
//! );
//! let outcome = pipeline.run(seed).await?;
//! println!("{}", outcome.document().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod compile;
mod config;
mod engine;
mod extraction;
mod in_memory_store;
mod ledger;
mod nodes;
mod persistence;
mod pipeline;
mod resume;

pub use adapter::{GeneratorAdapter, ResponseSchema};
pub use compile::compile_document;
pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use engine::{
    CompiledGraph, Guard, NodeContext, Router, RunSummary, Target, WorkflowEngine, WorkflowGraph,
};
pub use extraction::extract_json;
pub use in_memory_store::InMemoryStoryStore;
pub use ledger::{ConsistencyLedger, SCENE_TYPES, VarietyInputs, check_compliance, compute_variety};
pub use nodes::{
    AdvanceNode, BrainstormNode, BrainstormSceneNode, BuildWorldNode, CompileNode,
    CreateCharactersNode, InitializeNode, Node, NodeName, PlanChapterNode, PlanChaptersNode,
    ReflectNode, ResolveIssueNode, ReviewContinuityNode, ReviseSceneNode, UpdateCharactersNode,
    UpdateWorldNode, WriteSceneNode, story_graph,
};
pub use persistence::{IdCache, PersistenceManager, SaveStrategy, strategies_for};
pub use pipeline::{PipelineOutcome, StoryPipeline};
pub use resume::ResumePoint;
