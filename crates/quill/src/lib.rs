//! Quill - resumable long-form fiction generation.
//!
//! Quill drives a language model through a fixed story graph: brainstorm,
//! build the world and cast, plan chapters, then write, critique and revise
//! each scene while a consistency ledger tracks phrases, scene shapes,
//! one-time beats and who knows what. Every step is persisted as it happens,
//! so an interrupted run picks up at the next unwritten scene.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quill::{InMemoryStoryStore, OpenAiCompatClient, QuillConfig, StoryPipeline, StorySeed};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = QuillConfig::load()?;
//!     let generator = OpenAiCompatClient::new(&config.generator)?;
//!     let pipeline = StoryPipeline::new(
//!         Arc::new(InMemoryStoryStore::new()),
//!         Arc::new(generator),
//!         config.pipeline,
//!     );
//!     let seed = StorySeed::builder()
//!         .genre("gothic")
//!         .tone("brooding")
//!         .premise("A cartographer maps a house that grows a room every night.")
//!         .build()?;
//!     let outcome = pipeline.run(seed).await?;
//!     println!("{}", outcome.document().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `database` (default) - PostgreSQL story store
//!
//! # Architecture
//!
//! - `quill_error` - Error types
//! - `quill_core` - Story data model, working state and deltas
//! - `quill_interface` - `ContentGenerator` and `StoryStore` traits
//! - `quill_database` - PostgreSQL store
//! - `quill_models` - OpenAI-compatible HTTP generator
//! - `quill_narrative` - Workflow engine, ledger, persistence and nodes
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod status;

pub use self::config::QuillConfig;
pub use status::{StoryStatus, compile_stored};

pub use quill_core::*;
pub use quill_error::*;
pub use quill_interface::*;
pub use quill_models::{GeneratorSettings, GeneratorSettingsBuilder, OpenAiCompatClient};
pub use quill_narrative::{
    ConsistencyLedger, InMemoryStoryStore, PipelineConfig, PipelineConfigBuilder,
    PipelineOutcome, ResumePoint, RunSummary, StoryPipeline, compile_document,
};

#[cfg(feature = "database")]
pub use quill_database::PostgresStoryStore;
