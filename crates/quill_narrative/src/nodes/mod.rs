//! Pipeline nodes and the story graph that wires them.
//!
//! A node reads the working state, may call the generator and the ledger,
//! and returns one [`StateDelta`]. It never returns an error: every
//! collaborator failure is matched and replaced by the node's fallback.

mod aftermath;
mod name;
mod prompts;
mod routes;
mod scene;
mod setup;

pub use aftermath::{
    AdvanceNode, CompileNode, ResolveIssueNode, ReviewContinuityNode, UpdateCharactersNode,
    UpdateWorldNode,
};
pub use name::NodeName;
pub use routes::story_graph;
pub use scene::{BrainstormSceneNode, ReflectNode, ReviseSceneNode, WriteSceneNode};
pub use setup::{
    BrainstormNode, BuildWorldNode, CreateCharactersNode, InitializeNode, PlanChapterNode,
    PlanChaptersNode,
};

use crate::NodeContext;
use async_trait::async_trait;
use quill_core::{Location, StateDelta, WorkingState};

/// One unit of work in the graph.
#[async_trait]
pub trait Node: Send + Sync {
    /// Name this node is registered under.
    fn name(&self) -> NodeName;

    /// Produce the partial update for `state`.
    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta;
}

/// Up to `limit` written scenes strictly before `before`, reading order.
pub(crate) fn scenes_before(
    state: &WorkingState,
    before: Location,
    limit: usize,
) -> Vec<(Location, &str)> {
    let written: Vec<(Location, &str)> = state
        .planned_locations()
        .into_iter()
        .filter(|l| *l < before)
        .filter_map(|l| state.scene_content(l).map(|c| (l, c)))
        .collect();
    let skip = written.len().saturating_sub(limit);
    written.into_iter().skip(skip).collect()
}

/// Lower-case identifier derived from a display name.
pub(crate) fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{Chapter, Scene};

    #[test]
    fn slug_collapses_punctuation() {
        assert_eq!(slug("  Captain O'Neil-Ray "), "captain_o_neil_ray");
        assert_eq!(slug("Mara"), "mara");
    }

    #[test]
    fn scenes_before_skips_unwritten_and_later() {
        let mut state = WorkingState::default();
        let mut chapter = Chapter::new(1, "One", "");
        chapter.upsert_scene(Scene {
            number: 1,
            outline: String::new(),
            content: Some("first".into()),
        });
        chapter.upsert_scene(Scene::planned(2, ""));
        chapter.upsert_scene(Scene {
            number: 3,
            outline: String::new(),
            content: Some("third".into()),
        });
        state.chapters.push(chapter);

        let recent = scenes_before(&state, Location::new(1, 3), 5);
        assert_eq!(recent, vec![(Location::new(1, 1), "first")]);
    }
}
