//! Per-scene working documents: briefs, drafts, reflections and issues.

use crate::Location;
use serde::{Deserialize, Serialize};

/// Constraints handed to scene generation to push it away from recent
/// scene shapes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VarietyRequirement {
    /// Scene type to use
    pub scene_type: String,
    /// Whether the scene must move to a new setting
    pub change_setting: bool,
    /// Characters that must appear
    pub required_characters: Vec<String>,
    /// Characters that must not appear
    pub forbidden_characters: Vec<String>,
    /// Phrases that must not appear
    pub forbidden_phrases: Vec<String>,
}

/// The plan for the next scene to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneBrief {
    /// Scene being planned
    pub location: Location,
    /// What should happen
    pub summary: String,
    /// Characters on stage
    pub characters: Vec<String>,
    /// Progression keys this scene is meant to deliver
    pub progression_keys: Vec<String>,
    /// Variety constraint, if one applies
    pub variety: Option<VarietyRequirement>,
}

/// A draft of a scene in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDraft {
    /// Scene being drafted
    pub location: Location,
    /// Current prose
    pub content: String,
    /// True if the prose is a fallback placeholder
    pub placeholder: bool,
}

/// Critique of a draft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reflection {
    /// Whether the draft should be rewritten
    pub needs_revision: bool,
    /// Problems found
    pub issues: Vec<String>,
}

impl Reflection {
    /// A reflection that found nothing to fix.
    pub fn clean() -> Self {
        Self::default()
    }
}

/// A continuity problem spotted across recent scenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuityIssue {
    /// Scene that needs correcting
    pub location: Location,
    /// What is wrong
    pub description: String,
}
