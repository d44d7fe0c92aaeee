//! Core data types for the Quill narrative pipeline.
//!
//! This crate holds the plain data model shared by every other Quill crate:
//! story entities, ledger records, the [`WorkingState`] document threaded
//! through the workflow engine, and the [`StateDelta`] each node returns.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod character;
mod ledger;
mod location;
mod message;
mod plot;
mod request;
mod review;
mod stage;
mod state;
mod story;
mod world;

pub use character::{Character, Relationship};
pub use ledger::{KnowledgeEntry, PhraseRecord, ProgressionRecord, SceneStructureRecord, Visibility};
pub use location::{Location, ParseLocationError};
pub use message::{Message, Role};
pub use plot::{Importance, PlotStatus, PlotThread};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, Output};
pub use review::{ContinuityIssue, Reflection, SceneBrief, SceneDraft, VarietyRequirement};
pub use stage::SceneStage;
pub use state::{StateDelta, WorkingState};
pub use story::{Chapter, Scene, Story, StorySeed};
pub use world::WorldElement;
