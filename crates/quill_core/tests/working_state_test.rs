use quill_core::{
    Chapter, Location, Reflection, Scene, SceneDraft, SceneStage, StateDelta, StorySeed,
    WorkingState,
};

fn seed() -> StorySeed {
    StorySeed::builder()
        .genre("fantasy")
        .tone("earnest")
        .premise("A cartographer maps a city that keeps moving.")
        .build()
        .unwrap()
}

#[test]
fn fresh_state_carries_seed_settings() {
    let state = WorkingState::from_seed(seed());
    assert_eq!(state.story.genre, "fantasy");
    assert_eq!(state.story.language, "English");
    assert!(!state.has_outline());
    assert_eq!(state.cursor, Location::first());
}

#[test]
fn draft_delta_marks_scene_dirty() {
    let mut state = WorkingState::from_seed(seed());
    let mut chapter = Chapter::new(1, "Maps", "");
    chapter.upsert_scene(Scene::planned(1, "The first survey"));
    state.apply(StateDelta::ChapterPlan {
        chapters: vec![chapter],
    });

    let location = Location::first();
    let chapters = state.chapters_with_content(location, "Ink dried.").unwrap();
    state.apply(StateDelta::SceneDraft {
        draft: SceneDraft {
            location,
            content: "Ink dried.".into(),
            placeholder: false,
        },
        chapters,
        revision_attempts: 0,
        stage: SceneStage::Written,
    });

    assert_eq!(state.dirty_scene, Some(location));
    assert_eq!(state.scene_content(location), Some("Ink dried."));
    assert_eq!(state.stage, SceneStage::Written);
}

#[test]
fn continuity_review_captures_issue_count() {
    let mut state = WorkingState::default();
    state.issue_index = 4;
    state.apply(StateDelta::ContinuityReview {
        issues: vec![quill_core::ContinuityIssue {
            location: Location::first(),
            description: "eye colour changed".into(),
        }],
    });
    assert_eq!(state.issue_count, 1);
    assert_eq!(state.issue_index, 0);
}

#[test]
fn reflection_delta_keeps_attempt_count() {
    let mut state = WorkingState::default();
    state.revision_attempts = 1;
    state.apply(StateDelta::Reflection {
        reflection: Reflection {
            needs_revision: true,
            issues: vec!["flat dialogue".into()],
        },
        stage: SceneStage::Reflected,
    });
    assert_eq!(state.revision_attempts, 1);
    assert_eq!(state.stage, SceneStage::Reflected);
    assert!(state.reflection.unwrap().needs_revision);
}
