//! Node identifiers.

use std::str::FromStr;

/// Every node in the story graph.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum NodeName {
    /// Rebuild state from the store
    #[display("initialize")]
    Initialize,
    /// Title, outline and plot threads
    #[display("brainstorm")]
    Brainstorm,
    /// World elements
    #[display("build_world")]
    BuildWorld,
    /// Cast and relationships
    #[display("create_characters")]
    CreateCharacters,
    /// Chapter skeleton
    #[display("plan_chapters")]
    PlanChapters,
    /// Scenes of the current chapter
    #[display("plan_chapter")]
    PlanChapter,
    /// Brief for the current scene
    #[display("brainstorm_scene")]
    BrainstormScene,
    /// First draft of the current scene
    #[display("write_scene")]
    WriteScene,
    /// Critique of the draft
    #[display("reflect")]
    Reflect,
    /// Revised draft
    #[display("revise_scene")]
    ReviseScene,
    /// World and plot thread changes caused by the scene
    #[display("update_world")]
    UpdateWorld,
    /// Character changes caused by the scene
    #[display("update_characters")]
    UpdateCharacters,
    /// Continuity check over recent scenes
    #[display("review_continuity")]
    ReviewContinuity,
    /// Fix one continuity issue
    #[display("resolve_issue")]
    ResolveIssue,
    /// Move the cursor to the next scene
    #[display("advance")]
    Advance,
    /// Assemble the final document
    #[display("compile")]
    Compile,
}

impl NodeName {
    /// Snake-case name used in logs and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeName::Initialize => "initialize",
            NodeName::Brainstorm => "brainstorm",
            NodeName::BuildWorld => "build_world",
            NodeName::CreateCharacters => "create_characters",
            NodeName::PlanChapters => "plan_chapters",
            NodeName::PlanChapter => "plan_chapter",
            NodeName::BrainstormScene => "brainstorm_scene",
            NodeName::WriteScene => "write_scene",
            NodeName::Reflect => "reflect",
            NodeName::ReviseScene => "revise_scene",
            NodeName::UpdateWorld => "update_world",
            NodeName::UpdateCharacters => "update_characters",
            NodeName::ReviewContinuity => "review_continuity",
            NodeName::ResolveIssue => "resolve_issue",
            NodeName::Advance => "advance",
            NodeName::Compile => "compile",
        }
    }
}

impl FromStr for NodeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use strum::IntoEnumIterator;
        NodeName::iter()
            .find(|n| n.as_str() == s)
            .ok_or_else(|| format!("Unknown node: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn display_matches_as_str() {
        for node in NodeName::iter() {
            assert_eq!(node.to_string(), node.as_str());
            assert_eq!(node.as_str().parse::<NodeName>(), Ok(node));
        }
    }
}
