//! Trait definitions for the Quill narrative pipeline.
//!
//! Two seams separate the pipeline core from the outside world:
//! [`ContentGenerator`], the natural-language generation service, and
//! [`StoryStore`], the relational store that is the sole source of truth for
//! resuming a run.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod generator;
mod store;

pub use generator::ContentGenerator;
pub use store::{RowId, StoryStore};
