//! The working state threaded through the workflow engine, and the typed
//! partial updates nodes return.
//!
//! Merging is shallow: every field carried by a [`StateDelta`] replaces the
//! corresponding top-level field of [`WorkingState`] wholesale. A node that
//! needs to change one scene inside `chapters` reads the chapters, edits a
//! copy, and returns the whole list.

use crate::{
    Chapter, Character, ContinuityIssue, KnowledgeEntry, Location, PlotThread, Reflection,
    Relationship, SceneBrief, SceneDraft, SceneStage, Story, StorySeed, WorldElement,
};
use serde::{Deserialize, Serialize};

/// In-memory document for one generation run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkingState {
    /// Parameters the run was started with
    pub seed: Option<StorySeed>,
    /// Story configuration and outline
    pub story: Story,
    /// World elements
    pub world: Vec<WorldElement>,
    /// Cast
    pub characters: Vec<Character>,
    /// Undirected character relationships
    pub relationships: Vec<Relationship>,
    /// Plot threads
    pub plot_threads: Vec<PlotThread>,
    /// Chapter plan, ascending by number
    pub chapters: Vec<Chapter>,
    /// Scene currently being worked on
    pub cursor: Location,
    /// Brief for the current scene
    pub brief: Option<SceneBrief>,
    /// Draft of the current scene
    pub draft: Option<SceneDraft>,
    /// Latest critique of the draft
    pub reflection: Option<Reflection>,
    /// Revisions performed on the current scene
    pub revision_attempts: u32,
    /// Lifecycle stage of the current scene
    pub stage: SceneStage,
    /// Knowledge gained in the current scene, pending persistence
    pub knowledge_updates: Vec<KnowledgeEntry>,
    /// Issues found by the last continuity review
    pub continuity_issues: Vec<ContinuityIssue>,
    /// Number of issues captured at review time
    pub issue_count: usize,
    /// Next issue to resolve
    pub issue_index: usize,
    /// Scene whose content changed in the last step
    pub dirty_scene: Option<Location>,
    /// Set once every planned scene has been written
    pub finished: bool,
    /// Compiled document
    pub compiled: Option<String>,
}

/// Partial update returned by a node, one variant per phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StateDelta {
    /// State rebuilt from the store at startup
    Resumed {
        /// Story config
        story: Story,
        /// World elements
        world: Vec<WorldElement>,
        /// Cast
        characters: Vec<Character>,
        /// Relationships
        relationships: Vec<Relationship>,
        /// Plot threads
        plot_threads: Vec<PlotThread>,
        /// Chapters and their scenes
        chapters: Vec<Chapter>,
        /// Next scene to write
        cursor: Location,
        /// True if nothing remains to be written
        finished: bool,
    },
    /// Outline brainstormed
    Outline {
        /// Story with title and outline set
        story: Story,
        /// Initial plot threads
        plot_threads: Vec<PlotThread>,
    },
    /// World built or updated
    World {
        /// Full world list
        world: Vec<WorldElement>,
        /// Full plot thread list, when threads changed
        plot_threads: Option<Vec<PlotThread>>,
    },
    /// Cast created or updated
    Characters {
        /// Full cast
        characters: Vec<Character>,
        /// Full relationship list
        relationships: Vec<Relationship>,
        /// Knowledge gained in the current scene
        knowledge_updates: Vec<KnowledgeEntry>,
    },
    /// Chapter skeleton planned
    Chapters {
        /// Full chapter list
        chapters: Vec<Chapter>,
    },
    /// Scenes of one chapter planned
    ChapterPlan {
        /// Full chapter list
        chapters: Vec<Chapter>,
    },
    /// Brief produced for the current scene
    SceneBrief {
        /// The brief
        brief: SceneBrief,
    },
    /// Scene drafted or revised
    SceneDraft {
        /// The draft
        draft: SceneDraft,
        /// Full chapter list with the draft stored in place
        chapters: Vec<Chapter>,
        /// Revisions performed on this scene so far
        revision_attempts: u32,
        /// Written or Revised
        stage: SceneStage,
    },
    /// Draft critiqued
    Reflection {
        /// The critique
        reflection: Reflection,
        /// Reflected or Accepted
        stage: SceneStage,
    },
    /// Recent scenes reviewed for continuity. By this point the accepted
    /// scene and its world and character changes have been stored.
    ContinuityReview {
        /// Issues found
        issues: Vec<ContinuityIssue>,
    },
    /// One continuity issue handled
    IssueResolved {
        /// Index of the next issue
        issue_index: usize,
        /// Full chapter list, with the corrected scene in place
        chapters: Vec<Chapter>,
        /// Scene that was rewritten, if any
        corrected: Option<Location>,
    },
    /// Cursor moved to the next planned scene
    Advanced {
        /// New cursor
        cursor: Location,
        /// True if the plan is exhausted
        finished: bool,
    },
    /// Final document assembled
    Compiled {
        /// Markdown document
        document: String,
    },
    /// Nothing changed
    Unchanged,
}

impl StateDelta {
    /// Variant name, for logging.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl WorkingState {
    /// Fresh state for a new run.
    pub fn from_seed(seed: StorySeed) -> Self {
        Self {
            story: Story::from_seed(&seed),
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Merge a node's partial update.
    #[tracing::instrument(level = "trace", skip_all, fields(delta = delta.name()))]
    pub fn apply(&mut self, delta: StateDelta) {
        match delta {
            StateDelta::Resumed {
                story,
                world,
                characters,
                relationships,
                plot_threads,
                chapters,
                cursor,
                finished,
            } => {
                self.story = story;
                self.world = world;
                self.characters = characters;
                self.relationships = relationships;
                self.plot_threads = plot_threads;
                self.chapters = chapters;
                self.cursor = cursor;
                self.finished = finished;
            }
            StateDelta::Outline {
                story,
                plot_threads,
            } => {
                self.story = story;
                self.plot_threads = plot_threads;
            }
            StateDelta::World {
                world,
                plot_threads,
            } => {
                self.world = world;
                if let Some(plot_threads) = plot_threads {
                    self.plot_threads = plot_threads;
                }
            }
            StateDelta::Characters {
                characters,
                relationships,
                knowledge_updates,
            } => {
                self.characters = characters;
                self.relationships = relationships;
                self.knowledge_updates = knowledge_updates;
            }
            StateDelta::Chapters { chapters } | StateDelta::ChapterPlan { chapters } => {
                self.chapters = chapters;
            }
            StateDelta::SceneBrief { brief } => {
                self.brief = Some(brief);
                self.enter_stage(SceneStage::Brainstormed);
            }
            StateDelta::SceneDraft {
                draft,
                chapters,
                revision_attempts,
                stage,
            } => {
                self.dirty_scene = Some(draft.location);
                self.draft = Some(draft);
                self.chapters = chapters;
                self.revision_attempts = revision_attempts;
                self.enter_stage(stage);
            }
            StateDelta::Reflection { reflection, stage } => {
                self.reflection = Some(reflection);
                // a critique that accepts the draft passes through Reflected
                self.enter_stage(SceneStage::Reflected);
                if stage != SceneStage::Reflected {
                    self.enter_stage(stage);
                }
            }
            StateDelta::ContinuityReview { issues } => {
                self.enter_stage(SceneStage::Persisted);
                self.issue_count = issues.len();
                self.issue_index = 0;
                self.continuity_issues = issues;
            }
            StateDelta::IssueResolved {
                issue_index,
                chapters,
                corrected,
            } => {
                self.issue_index = issue_index;
                self.chapters = chapters;
                self.dirty_scene = corrected;
            }
            StateDelta::Advanced { cursor, finished } => {
                self.enter_stage(SceneStage::Planned);
                self.cursor = cursor;
                self.finished = finished;
                self.reset_scene_scratch();
            }
            StateDelta::Compiled { document } => {
                self.compiled = Some(document);
            }
            StateDelta::Unchanged => {}
        }
    }

    /// Move the current scene to `next`, warning when the lifecycle does not
    /// allow it. Returns whether the transition was legal.
    fn enter_stage(&mut self, next: SceneStage) -> bool {
        let legal = self.stage.can_advance_to(next);
        if !legal {
            tracing::warn!(
                location = %self.cursor,
                from = ?self.stage,
                to = ?next,
                "Illegal scene stage transition"
            );
        }
        self.stage = next;
        legal
    }

    fn reset_scene_scratch(&mut self) {
        self.brief = None;
        self.draft = None;
        self.reflection = None;
        self.revision_attempts = 0;
        self.stage = SceneStage::Planned;
        self.knowledge_updates.clear();
        self.continuity_issues.clear();
        self.issue_count = 0;
        self.issue_index = 0;
        self.dirty_scene = None;
    }

    /// True once an outline exists.
    pub fn has_outline(&self) -> bool {
        self.story.has_outline()
    }

    /// Look up a chapter by number.
    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }

    /// The chapter under the cursor.
    pub fn current_chapter(&self) -> Option<&Chapter> {
        self.chapter(self.cursor.chapter)
    }

    /// True if the chapter under the cursor has at least one planned scene.
    pub fn current_chapter_planned(&self) -> bool {
        self.current_chapter().is_some_and(|c| !c.scenes.is_empty())
    }

    /// Stored prose for a scene.
    pub fn scene_content(&self, location: Location) -> Option<&str> {
        self.chapter(location.chapter)
            .and_then(|c| c.scene(location.scene))
            .and_then(|s| s.content.as_deref())
    }

    /// Copy of `chapters` with `content` stored at `location`.
    ///
    /// Returns `None` if the location is not in the plan.
    pub fn chapters_with_content(&self, location: Location, content: &str) -> Option<Vec<Chapter>> {
        let mut chapters = self.chapters.clone();
        let scene = chapters
            .iter_mut()
            .find(|c| c.number == location.chapter)?
            .scene_mut(location.scene)?;
        scene.content = Some(content.to_string());
        Some(chapters)
    }

    /// The planned location following `after`, in reading order.
    ///
    /// A chapter with no planned scenes yields its own first scene so the
    /// caller can plan it.
    pub fn next_location(&self, after: Location) -> Option<Location> {
        let chapter = self.chapter(after.chapter)?;
        if let Some(scene) = chapter
            .scenes
            .iter()
            .map(|s| s.number)
            .filter(|n| *n > after.scene)
            .min()
        {
            return Some(Location::new(after.chapter, scene));
        }
        let next = self
            .chapters
            .iter()
            .filter(|c| c.number > after.chapter)
            .min_by_key(|c| c.number)?;
        let scene = next.scenes.iter().map(|s| s.number).min().unwrap_or(1);
        Some(Location::new(next.number, scene))
    }

    /// Every planned scene location in reading order.
    pub fn planned_locations(&self) -> Vec<Location> {
        let mut locations: Vec<Location> = self.chapters.iter().flat_map(|c| c.locations()).collect();
        locations.sort();
        locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scene;

    fn planned_state() -> WorkingState {
        let mut state = WorkingState::default();
        for number in 1..=2 {
            let mut chapter = Chapter::new(number, format!("Chapter {}", number), "");
            chapter.upsert_scene(Scene::planned(1, "a"));
            chapter.upsert_scene(Scene::planned(2, "b"));
            state.chapters.push(chapter);
        }
        state
    }

    #[test]
    fn chapters_are_replaced_not_merged() {
        let mut state = planned_state();
        state.apply(StateDelta::Chapters {
            chapters: vec![Chapter::new(7, "Only", "")],
        });
        assert_eq!(state.chapters.len(), 1);
        assert_eq!(state.chapters[0].number, 7);
    }

    #[test]
    fn world_delta_leaves_threads_alone_when_absent() {
        let mut state = WorkingState::default();
        state.plot_threads.push(PlotThread {
            name: "heist".into(),
            description: String::new(),
            status: Default::default(),
            importance: Default::default(),
        });
        state.apply(StateDelta::World {
            world: vec![],
            plot_threads: None,
        });
        assert_eq!(state.plot_threads.len(), 1);
    }

    #[test]
    fn advance_clears_scene_scratch() {
        let mut state = planned_state();
        state.revision_attempts = 2;
        state.issue_count = 3;
        state.dirty_scene = Some(Location::first());
        state.stage = SceneStage::Persisted;
        state.apply(StateDelta::Advanced {
            cursor: Location::new(1, 2),
            finished: false,
        });
        assert_eq!(state.revision_attempts, 0);
        assert_eq!(state.issue_count, 0);
        assert!(state.dirty_scene.is_none());
        assert_eq!(state.cursor, Location::new(1, 2));
    }

    #[test]
    fn next_location_rolls_into_next_chapter() {
        let state = planned_state();
        assert_eq!(state.next_location(Location::new(1, 1)), Some(Location::new(1, 2)));
        assert_eq!(state.next_location(Location::new(1, 2)), Some(Location::new(2, 1)));
        assert_eq!(state.next_location(Location::new(2, 2)), None);
    }

    #[test]
    fn chapters_with_content_edits_a_copy() {
        let state = planned_state();
        let chapters = state
            .chapters_with_content(Location::new(2, 1), "Rain.")
            .unwrap();
        assert_eq!(chapters[1].scenes[0].content.as_deref(), Some("Rain."));
        assert!(state.scene_content(Location::new(2, 1)).is_none());
        assert!(state.chapters_with_content(Location::new(9, 1), "x").is_none());
    }

    #[test]
    fn accepted_reflection_moves_through_reflected() {
        let mut state = planned_state();
        state.stage = SceneStage::Written;
        state.apply(StateDelta::Reflection {
            reflection: Reflection::clean(),
            stage: SceneStage::Accepted,
        });
        assert_eq!(state.stage, SceneStage::Accepted);
        assert!(state.enter_stage(SceneStage::Persisted));
        assert!(state.enter_stage(SceneStage::Planned));
    }

    #[test]
    fn out_of_order_stage_is_flagged_but_applied() {
        let mut state = planned_state();
        assert!(!state.enter_stage(SceneStage::Accepted));
        assert_eq!(state.stage, SceneStage::Accepted);

        let mut state = planned_state();
        state.apply(StateDelta::ContinuityReview { issues: vec![] });
        assert_eq!(state.stage, SceneStage::Persisted);
    }
}
