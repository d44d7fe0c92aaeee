//! End-to-end runs of the story graph over the in-memory store.

mod common;

use common::{LEARNED_SECRET, ScriptedGenerator, seed};
use quill_core::{Character, Location, Scene, Story, Visibility};
use quill_error::{QuillErrorKind, WorkflowErrorKind};
use quill_interface::StoryStore;
use quill_narrative::{InMemoryStoryStore, PipelineConfig, StoryPipeline};
use std::sync::Arc;

fn config() -> PipelineConfig {
    PipelineConfig::builder()
        .max_regeneration_attempts(2u32)
        .build()
        .unwrap()
}

fn pipeline(store: &InMemoryStoryStore, generator: &Arc<ScriptedGenerator>) -> StoryPipeline {
    StoryPipeline::new(Arc::new(store.clone()), generator.clone(), config())
}

#[tokio::test]
async fn two_by_two_plan_compiles_in_reading_order() {
    let store = InMemoryStoryStore::new();
    let generator = Arc::new(ScriptedGenerator::new(2, 2));

    let outcome = pipeline(&store, &generator).run(seed()).await.unwrap();
    let document = outcome.document().expect("compiled document");

    let positions: Vec<usize> = ["1.1", "1.2", "2.1", "2.2"]
        .iter()
        .map(|loc| {
            let needle = format!("Scene {} prose.", loc);
            assert_eq!(document.matches(&needle).count(), 1, "{} once", loc);
            document.find(&needle).unwrap()
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(document.find("## Chapter 1").unwrap() < document.find("## Chapter 2").unwrap());
    assert!(document.starts_with("# The Glass Coast"));
    assert_eq!(outcome.summary.scenes_written, 4);
    assert_eq!(outcome.summary.persistence_failures, 0);

    // every scene reached the store
    let stored = store.list_chapters().await.unwrap();
    assert!(stored.iter().flat_map(|c| &c.scenes).all(Scene::is_written));
    assert_eq!(store.scene_count().await, 4);
}

#[tokio::test]
async fn fresh_run_brainstorms_once() {
    let store = InMemoryStoryStore::new();
    let generator = Arc::new(ScriptedGenerator::new(1, 1));

    pipeline(&store, &generator).run(seed()).await.unwrap();

    assert_eq!(generator.calls().first().map(String::as_str), Some("outline"));
    assert_eq!(generator.count("outline"), 1);
}

#[tokio::test]
async fn stored_outline_skips_setup() {
    let store = InMemoryStoryStore::new();
    store
        .upsert_story(&Story {
            title: "Resumed".into(),
            outline: Some("Already outlined.".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .upsert_character(&Character {
            identifier: "mara".into(),
            name: "Mara".into(),
            role: "protagonist".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let one = store.upsert_chapter(1, "One", "").await.unwrap();
    store
        .upsert_scene(one, 1, Some("open"), Some("Stored opening."))
        .await
        .unwrap();
    store.upsert_scene(one, 2, Some("next"), None).await.unwrap();
    store.upsert_chapter(2, "Two", "").await.unwrap();

    let generator = Arc::new(ScriptedGenerator::new(2, 2));
    let outcome = pipeline(&store, &generator).run(seed()).await.unwrap();

    for setup in ["outline", "world", "cast", "chapters"] {
        assert_eq!(generator.count(setup), 0, "{} should be skipped", setup);
    }
    assert_eq!(outcome.summary.scenes_written, 3);
    let document = outcome.document().unwrap();
    assert!(document.starts_with("# Resumed"));
    assert!(document.find("Stored opening.").unwrap() < document.find("Scene 1.2 prose.").unwrap());
    assert!(document.contains("Scene 2.2 prose."));
}

#[tokio::test]
async fn finished_run_goes_straight_to_compile() {
    let store = InMemoryStoryStore::new();
    store
        .upsert_story(&Story {
            title: "Done".into(),
            outline: Some("Outline.".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .upsert_character(&Character {
            identifier: "mara".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let one = store.upsert_chapter(1, "One", "").await.unwrap();
    store
        .upsert_scene(one, 1, Some("only"), Some("The end."))
        .await
        .unwrap();

    let generator = Arc::new(ScriptedGenerator::new(1, 1));
    let outcome = pipeline(&store, &generator).run(seed()).await.unwrap();

    assert_eq!(outcome.summary.steps, 2);
    assert!(generator.calls().is_empty());
    assert!(outcome.document().unwrap().contains("The end."));
}

#[tokio::test]
async fn endless_rejection_is_force_accepted() {
    let store = InMemoryStoryStore::new();
    let generator = Arc::new(ScriptedGenerator::rejecting(1, 2));

    let outcome = pipeline(&store, &generator).run(seed()).await.unwrap();

    // initial critique plus one per allowed revision, for each scene
    assert_eq!(generator.count("critique"), 2 * 3);
    assert_eq!(outcome.summary.forced_accepts, 2);
    assert_eq!(outcome.summary.scenes_written, 2);
    assert!(outcome.document().is_some());
}

#[tokio::test]
async fn step_budget_aborts_the_run() {
    let store = InMemoryStoryStore::new();
    let generator = Arc::new(ScriptedGenerator::new(2, 2));
    let config = PipelineConfig::builder().max_steps(5usize).build().unwrap();
    let pipeline = StoryPipeline::new(Arc::new(store), generator, config);

    let err = pipeline.run(seed()).await.unwrap_err();
    assert!(err.is_step_budget());
    match err.kind() {
        QuillErrorKind::Workflow(e) => {
            assert_eq!(
                e.kind,
                WorkflowErrorKind::StepBudgetExceeded {
                    limit: 5,
                    last_node: "plan_chapters".into()
                }
            );
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn failing_store_does_not_stop_the_run() {
    let store = InMemoryStoryStore::new();
    store.set_reject_writes(true);
    let generator = Arc::new(ScriptedGenerator::new(1, 2));

    let outcome = pipeline(&store, &generator).run(seed()).await.unwrap();

    assert!(outcome.summary.persistence_failures > 0);
    assert_eq!(outcome.summary.scenes_written, 2);
    assert!(outcome.document().unwrap().contains("Scene 1.2 prose."));
    assert!(store.list_chapters().await.unwrap().is_empty());
}

#[tokio::test]
async fn generator_outage_falls_back_everywhere() {
    let store = InMemoryStoryStore::new();
    let generator = Arc::new(ScriptedGenerator::failing());
    let config = PipelineConfig::builder()
        .chapters(2u32)
        .scenes_per_chapter(1u32)
        .build()
        .unwrap();
    let pipeline = StoryPipeline::new(Arc::new(store.clone()), generator.clone(), config);

    let outcome = pipeline.run(seed()).await.unwrap();

    assert!(outcome.summary.collaborator_failures > 0);
    assert_eq!(outcome.summary.scenes_written, 2);
    let document = outcome.document().unwrap();
    assert!(document.contains("## Chapter 2: Chapter 2"));
    assert!(document.contains("[Scene 2.1:"));
    assert_eq!(
        store.latest_written_location().await.unwrap(),
        Some(Location::new(2, 1))
    );
}

#[tokio::test]
async fn continuity_issues_rewrite_the_flagged_scenes() {
    let store = InMemoryStoryStore::new();
    let generator =
        Arc::new(ScriptedGenerator::new(1, 2).with_continuity_issues(&[(1, 1), (1, 2)]));

    let outcome = pipeline(&store, &generator).run(seed()).await.unwrap();

    // a single scene is never reviewed, so only the second scene triggers one
    assert_eq!(generator.count("continuity"), 1);
    // two accepted drafts plus one rewrite per issue
    assert_eq!(generator.count("critique"), 2);
    assert_eq!(generator.count("text"), 4);
    let document = outcome.document().unwrap();
    assert!(document.contains("Scene 1.1 prose, corrected."));
    assert!(document.contains("Scene 1.2 prose, corrected."));
    assert_eq!(outcome.summary.persistence_failures, 0);

    let stored: Vec<String> = store
        .list_chapters()
        .await
        .unwrap()
        .iter()
        .flat_map(|c| &c.scenes)
        .filter_map(|s| s.content.clone())
        .collect();
    assert_eq!(
        stored,
        vec![
            "Scene 1.1 prose, corrected.".to_string(),
            "Scene 1.2 prose, corrected.".to_string()
        ]
    );
}

#[tokio::test]
async fn secret_learned_and_revealed_in_one_scene_reaches_the_recipient() {
    let store = InMemoryStoryStore::new();
    let generator = Arc::new(ScriptedGenerator::revealing(1, 1));

    let outcome = pipeline(&store, &generator).run(seed()).await.unwrap();
    assert_eq!(outcome.summary.persistence_failures, 0);

    let mara = store.find_character_id("mara").await.unwrap().unwrap();
    let owned = store.list_knowledge(mara).await.unwrap();
    let secret = owned.iter().find(|k| k.fact == LEARNED_SECRET).unwrap();
    assert_eq!(secret.visibility, Visibility::Revealed);
    assert_eq!(owned.iter().filter(|k| k.fact == LEARNED_SECRET).count(), 1);

    let tobin = store.find_character_id("tobin").await.unwrap().unwrap();
    let heard = store.list_knowledge(tobin).await.unwrap();
    let entry = heard.iter().find(|k| k.fact == LEARNED_SECRET).unwrap();
    assert_eq!(entry.visibility, Visibility::Public);
    assert_eq!(entry.source, "revealed by mara");
}
