//! Workflow engine: graph definition, node context and the run loop.

mod context;
mod graph;
mod runner;

pub use context::{NodeContext, RunSummary};
pub use graph::{CompiledGraph, Guard, Router, Target, WorkflowGraph};
pub use runner::WorkflowEngine;
