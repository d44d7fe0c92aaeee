//! Command handlers.

use super::SeedArgs;
use quill::{
    ConfigError, ConfigErrorKind, InMemoryStoryStore, OpenAiCompatClient, QuillConfig,
    QuillResult, StoryPipeline, StorySeed, StoryStatus, StoryStore, compile_stored,
};
use std::path::Path;
use std::sync::Arc;

/// Open the durable store, or an in-memory one when asked.
///
/// # Errors
///
/// Fails when no durable store is reachable and `in_memory` is false. No
/// node runs in that case.
pub fn open_store(in_memory: bool) -> QuillResult<Arc<dyn StoryStore>> {
    if in_memory {
        tracing::warn!("Using in-memory store, nothing will survive this process");
        return Ok(Arc::new(InMemoryStoryStore::new()));
    }
    open_database()
}

#[cfg(feature = "database")]
fn open_database() -> QuillResult<Arc<dyn StoryStore>> {
    let store = quill::PostgresStoryStore::from_env()?;
    tracing::info!("Connected to PostgreSQL story store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "database"))]
fn open_database() -> QuillResult<Arc<dyn StoryStore>> {
    Err(ConfigError::invalid(
        "built without the `database` feature; pass --in-memory",
    ))?
}

/// Generate or resume a story and emit the compiled document.
pub async fn run_story(
    config: QuillConfig,
    store: Arc<dyn StoryStore>,
    seed: SeedArgs,
    max_steps: Option<usize>,
    output: Option<&Path>,
) -> QuillResult<()> {
    let pipeline_config = match max_steps {
        Some(limit) => config.pipeline.with_max_steps(limit),
        None => config.pipeline,
    };
    pipeline_config.validate().map_err(ConfigError::invalid)?;

    let generator = OpenAiCompatClient::new(&config.generator)?;
    let seed = StorySeed::builder()
        .genre(seed.genre)
        .tone(seed.tone)
        .author_style(seed.author_style)
        .language(seed.language)
        .premise(seed.premise)
        .build()
        .map_err(|e| ConfigError::invalid(format!("story seed: {}", e)))?;

    let pipeline = StoryPipeline::new(store, Arc::new(generator), pipeline_config);
    let outcome = pipeline.run(seed).await?;
    let summary = outcome.summary;
    tracing::info!(
        steps = summary.steps,
        scenes_written = summary.scenes_written,
        forced_accepts = summary.forced_accepts,
        collaborator_failures = summary.collaborator_failures,
        persistence_failures = summary.persistence_failures,
        "Run complete"
    );

    match outcome.document() {
        Some(document) => emit(document, output),
        None => {
            tracing::warn!("Run ended without a compiled document");
            Ok(())
        }
    }
}

/// Print the stored story's progress.
pub async fn show_status(store: &dyn StoryStore, json: bool) -> QuillResult<()> {
    let Some(status) = StoryStatus::gather(store).await? else {
        println!("No story stored yet.");
        return Ok(());
    };
    if json {
        let text = serde_json::to_string_pretty(&status)
            .map_err(|e| ConfigError::new(ConfigErrorKind::Output(e.to_string())))?;
        println!("{}", text);
    } else {
        println!("{}", status);
    }
    Ok(())
}

/// Compile the stored story without generating anything.
pub async fn compile_story(store: &dyn StoryStore, output: Option<&Path>) -> QuillResult<()> {
    match compile_stored(store).await? {
        Some(document) => emit(&document, output),
        None => {
            println!("No story stored yet.");
            Ok(())
        }
    }
}

fn emit(document: &str, output: Option<&Path>) -> QuillResult<()> {
    match output {
        Some(path) => {
            std::fs::write(path, document).map_err(|e| {
                ConfigError::new(ConfigErrorKind::Output(format!("{}: {}", path.display(), e)))
            })?;
            tracing::info!(path = %path.display(), bytes = document.len(), "Wrote document");
        }
        None => println!("{}", document),
    }
    Ok(())
}
