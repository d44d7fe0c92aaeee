//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Quill - resumable long-form fiction generation
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Resumable long-form fiction generation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file replacing the layered defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep the story in memory instead of PostgreSQL (lost on exit)
    #[arg(long, global = true)]
    pub in_memory: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a story, resuming the stored one if present
    Run {
        /// Seed for a fresh story
        #[command(flatten)]
        seed: SeedArgs,

        /// Override the step budget
        #[arg(long)]
        max_steps: Option<usize>,

        /// Write the compiled document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show progress of the stored story
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compile the stored story to Markdown
    Compile {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parameters of a fresh story. Ignored when resuming.
#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    /// Genre label
    #[arg(long, default_value = "literary")]
    pub genre: String,

    /// Overall tone
    #[arg(long, default_value = "measured")]
    pub tone: String,

    /// Author whose style the prose imitates
    #[arg(long, default_value = "")]
    pub author_style: String,

    /// Prose language
    #[arg(long, default_value = "English")]
    pub language: String,

    /// Initial premise
    #[arg(long, default_value = "")]
    pub premise: String,
}
