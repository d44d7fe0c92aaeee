//! Quill CLI binary.
//!
//! - Generate a story, resuming a stored one
//! - Report progress of the stored story
//! - Compile the stored story to Markdown

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, compile_story, open_store, run_story, show_status};

    // Load .env before anything reads the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let config = match &cli.config {
        Some(path) => quill::QuillConfig::from_file(path)?,
        None => quill::QuillConfig::load()?,
    };

    // Precondition: no node runs without a store
    let store = open_store(cli.in_memory)?;

    match cli.command {
        Commands::Run {
            seed,
            max_steps,
            output,
        } => {
            run_story(config, store, seed, max_steps, output.as_deref()).await?;
        }

        Commands::Status { json } => {
            show_status(store.as_ref(), json).await?;
        }

        Commands::Compile { output } => {
            compile_story(store.as_ref(), output.as_deref()).await?;
        }
    }

    Ok(())
}
