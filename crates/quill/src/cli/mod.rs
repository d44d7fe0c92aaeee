//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the quill binary.

mod commands;
mod run;

pub use commands::{Cli, Commands, SeedArgs};
pub use run::{compile_story, open_store, run_story, show_status};
