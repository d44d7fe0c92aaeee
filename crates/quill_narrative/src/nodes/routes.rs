//! The story graph.

use super::*;
use crate::{CompiledGraph, PipelineConfig, Router, Target, WorkflowGraph};
use quill_error::WorkflowError;

/// Build and validate the standard story graph.
///
/// ```text
/// initialize ─┬─> brainstorm -> build_world -> create_characters -> plan_chapters
///             ├─> build_world / create_characters / plan_chapters   (resume)
///             ├─> plan_chapter / brainstorm_scene                   (resume)
///             └─> compile                                           (finished)
/// plan_chapters -> plan_chapter -> brainstorm_scene -> write_scene -> reflect
/// reflect ─┬─> revise_scene -> reflect      (needs revision, attempts left)
///          └─> update_world -> update_characters -> review_continuity
/// review_continuity ─┬─> resolve_issue ⟲    (issues pending)
///                    └─> advance
/// advance ─┬─> compile -> END               (plan exhausted)
///          ├─> plan_chapter                 (next chapter unplanned)
///          └─> brainstorm_scene
/// ```
pub fn story_graph(config: &PipelineConfig) -> Result<CompiledGraph, WorkflowError> {
    let max_attempts = *config.max_regeneration_attempts();
    let mut graph = WorkflowGraph::new();

    graph
        .add_node(InitializeNode)
        .add_node(BrainstormNode)
        .add_node(BuildWorldNode)
        .add_node(CreateCharactersNode)
        .add_node(PlanChaptersNode)
        .add_node(PlanChapterNode)
        .add_node(BrainstormSceneNode)
        .add_node(WriteSceneNode)
        .add_node(ReflectNode)
        .add_node(ReviseSceneNode)
        .add_node(UpdateWorldNode)
        .add_node(UpdateCharactersNode)
        .add_node(ReviewContinuityNode)
        .add_node(ResolveIssueNode)
        .add_node(AdvanceNode)
        .add_node(CompileNode)
        .set_entry(NodeName::Initialize);

    graph.add_conditional_edges(
        NodeName::Initialize,
        Router::new(NodeName::BrainstormScene)
            .route("no_outline", |s| !s.has_outline(), NodeName::Brainstorm)
            .route(
                "no_world",
                |s| s.world.is_empty() && s.characters.is_empty(),
                NodeName::BuildWorld,
            )
            .route("no_cast", |s| s.characters.is_empty(), NodeName::CreateCharacters)
            .route("no_chapters", |s| s.chapters.is_empty(), NodeName::PlanChapters)
            .route("finished", |s| s.finished, NodeName::Compile)
            .route(
                "chapter_unplanned",
                |s| !s.current_chapter_planned(),
                NodeName::PlanChapter,
            ),
    );

    graph
        .add_edge(NodeName::Brainstorm, NodeName::BuildWorld)
        .add_edge(NodeName::BuildWorld, NodeName::CreateCharacters)
        .add_edge(NodeName::CreateCharacters, NodeName::PlanChapters)
        .add_edge(NodeName::PlanChapters, NodeName::PlanChapter)
        .add_edge(NodeName::PlanChapter, NodeName::BrainstormScene)
        .add_edge(NodeName::BrainstormScene, NodeName::WriteScene)
        .add_edge(NodeName::WriteScene, NodeName::Reflect)
        .add_edge(NodeName::ReviseScene, NodeName::Reflect)
        .add_edge(NodeName::UpdateWorld, NodeName::UpdateCharacters)
        .add_edge(NodeName::UpdateCharacters, NodeName::ReviewContinuity)
        .add_edge(NodeName::Compile, Target::End);

    graph.add_conditional_edges(
        NodeName::Reflect,
        Router::new(NodeName::UpdateWorld).route(
            "needs_revision",
            move |s| {
                s.reflection.as_ref().is_some_and(|r| r.needs_revision)
                    && s.revision_attempts < max_attempts
            },
            NodeName::ReviseScene,
        ),
    );

    graph.add_conditional_edges(
        NodeName::ReviewContinuity,
        Router::new(NodeName::Advance).route(
            "issues_found",
            |s| s.issue_count > 0,
            NodeName::ResolveIssue,
        ),
    );

    graph.add_conditional_edges(
        NodeName::ResolveIssue,
        Router::new(NodeName::Advance).route(
            "issues_pending",
            |s| s.issue_index < s.issue_count,
            NodeName::ResolveIssue,
        ),
    );

    graph.add_conditional_edges(
        NodeName::Advance,
        Router::new(NodeName::BrainstormScene)
            .route("finished", |s| s.finished, NodeName::Compile)
            .route(
                "chapter_unplanned",
                |s| !s.current_chapter_planned(),
                NodeName::PlanChapter,
            ),
    );

    graph.compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::{Chapter, Character, Reflection, Scene, Story};

    fn graph() -> CompiledGraph {
        story_graph(&PipelineConfig::default()).unwrap()
    }

    fn set_up_state() -> WorkingState {
        let mut chapter = Chapter::new(1, "One", "");
        chapter.upsert_scene(Scene::planned(1, "a"));
        WorkingState {
            story: Story {
                outline: Some("Outline".into()),
                ..Default::default()
            },
            characters: vec![Character::default()],
            chapters: vec![chapter],
            ..Default::default()
        }
    }

    #[test]
    fn fresh_state_routes_to_brainstorm() {
        let next = graph()
            .next(NodeName::Initialize, &WorkingState::default())
            .unwrap();
        assert_eq!(next, Target::Node(NodeName::Brainstorm));
    }

    #[test]
    fn outlined_state_skips_brainstorm() {
        let next = graph().next(NodeName::Initialize, &set_up_state()).unwrap();
        assert_eq!(next, Target::Node(NodeName::BrainstormScene));
    }

    #[test]
    fn revision_stops_at_attempt_limit() {
        let mut state = set_up_state();
        state.reflection = Some(Reflection {
            needs_revision: true,
            issues: vec!["flat".into()],
        });
        state.revision_attempts = 1;
        assert_eq!(
            graph().next(NodeName::Reflect, &state).unwrap(),
            Target::Node(NodeName::ReviseScene)
        );
        state.revision_attempts = 2;
        assert_eq!(
            graph().next(NodeName::Reflect, &state).unwrap(),
            Target::Node(NodeName::UpdateWorld)
        );
    }

    #[test]
    fn resolve_loop_exits_at_captured_count() {
        let mut state = set_up_state();
        state.issue_count = 2;
        state.issue_index = 1;
        assert_eq!(
            graph().next(NodeName::ResolveIssue, &state).unwrap(),
            Target::Node(NodeName::ResolveIssue)
        );
        state.issue_index = 2;
        assert_eq!(
            graph().next(NodeName::ResolveIssue, &state).unwrap(),
            Target::Node(NodeName::Advance)
        );
    }
}
