//! The facade's read-only views agree with a finished run.

use async_trait::async_trait;
use quill::{
    ContentGenerator, GenerateRequest, GenerateResponse, GeneratorError, GeneratorErrorKind,
    InMemoryStoryStore, PipelineConfig, QuillResult, StoryPipeline, StorySeed, StoryStatus,
    compile_stored,
};
use std::sync::Arc;

/// Generator that is always down, so every node takes its fallback.
struct Offline;

#[async_trait]
impl ContentGenerator for Offline {
    async fn generate(&self, _req: &GenerateRequest) -> QuillResult<GenerateResponse> {
        Err(GeneratorError::new(GeneratorErrorKind::Transport(
            "connection refused".to_string(),
        )))?
    }

    fn provider_name(&self) -> &'static str {
        "offline"
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

fn seed() -> StorySeed {
    StorySeed::builder()
        .genre("fable")
        .tone("gentle")
        .premise("A heron keeps the accounts of a river.")
        .build()
        .unwrap()
}

#[tokio::test]
async fn stored_document_matches_run_output() {
    let store = InMemoryStoryStore::new();
    let config = PipelineConfig::builder()
        .chapters(2u32)
        .scenes_per_chapter(2u32)
        .build()
        .unwrap();
    let pipeline = StoryPipeline::new(Arc::new(store.clone()), Arc::new(Offline), config);

    let outcome = pipeline.run(seed()).await.unwrap();

    let stored = compile_stored(&store).await.unwrap().unwrap();
    assert_eq!(outcome.document(), Some(stored.as_str()));

    let status = StoryStatus::gather(&store).await.unwrap().unwrap();
    assert!(status.finished);
    assert_eq!(status.next, None);
    assert_eq!((status.written_scenes, status.planned_scenes), (4, 4));
    assert_eq!(status.characters, 1);
}

#[tokio::test]
async fn second_run_only_compiles() {
    let store = InMemoryStoryStore::new();
    let config = PipelineConfig::builder()
        .chapters(1u32)
        .scenes_per_chapter(1u32)
        .build()
        .unwrap();
    let pipeline = StoryPipeline::new(Arc::new(store.clone()), Arc::new(Offline), config);

    let first = pipeline.run(seed()).await.unwrap();
    let second = pipeline.run(seed()).await.unwrap();

    assert_eq!(second.summary.steps, 2);
    assert_eq!(second.summary.collaborator_failures, 0);
    assert_eq!(first.document(), second.document());
}
