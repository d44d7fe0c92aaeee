//! Which slice of the working state each node writes.

use crate::NodeName;

/// One kind of store write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SaveStrategy {
    /// The story row
    #[display("story_config")]
    StoryConfig,
    /// Every plot thread
    #[display("plot_threads")]
    PlotThreads,
    /// Every world element
    #[display("world")]
    World,
    /// Every character, then every relationship
    #[display("characters")]
    Characters,
    /// Pending knowledge entries
    #[display("knowledge")]
    Knowledge,
    /// Every chapter row and its planned scenes
    #[display("chapters")]
    Chapters,
    /// The current chapter and its planned scenes
    #[display("chapter_plan")]
    ChapterPlan,
    /// Content of the scene that changed
    #[display("scene_content")]
    SceneContent,
}

/// Writes to perform after `node` returns, in order.
pub fn strategies_for(node: NodeName) -> &'static [SaveStrategy] {
    use SaveStrategy::*;
    match node {
        NodeName::Initialize => &[StoryConfig],
        NodeName::Brainstorm => &[StoryConfig, PlotThreads],
        NodeName::BuildWorld => &[World],
        NodeName::CreateCharacters | NodeName::UpdateCharacters => &[Characters, Knowledge],
        NodeName::PlanChapters => &[Chapters],
        NodeName::PlanChapter => &[ChapterPlan],
        NodeName::WriteScene | NodeName::ReviseScene | NodeName::ResolveIssue => &[SceneContent],
        NodeName::UpdateWorld => &[World, PlotThreads],
        NodeName::BrainstormScene
        | NodeName::Reflect
        | NodeName::ReviewContinuity
        | NodeName::Advance
        | NodeName::Compile => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_writers_save_content_only() {
        for node in [NodeName::WriteScene, NodeName::ReviseScene, NodeName::ResolveIssue] {
            assert_eq!(strategies_for(node), &[SaveStrategy::SceneContent]);
        }
        assert!(strategies_for(NodeName::Advance).is_empty());
    }
}
