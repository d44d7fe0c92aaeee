//! Deterministic variety requirement for the next scene.

use super::structure::variety_score;
use quill_core::{Character, SceneStructureRecord, VarietyRequirement};

/// Scene types the pipeline rotates through.
pub const SCENE_TYPES: [&str; 6] = [
    "action",
    "dialogue",
    "introspection",
    "discovery",
    "confrontation",
    "transition",
];

const FORBIDDEN_PHRASE_LIMIT: usize = 10;

/// Recent history the requirement is computed from.
#[derive(Debug, Clone, Copy)]
pub struct VarietyInputs<'a> {
    /// Last N structure records, reading order
    pub recent: &'a [SceneStructureRecord],
    /// Prose of the last N written scenes, reading order
    pub recent_scenes: &'a [&'a str],
    /// Cast
    pub characters: &'a [Character],
    /// Recently used phrases, newest last
    pub recent_phrases: &'a [String],
    /// Score below which the setting must change
    pub threshold: f64,
}

/// Build the requirement that diverges most from recent scenes.
///
/// - scene type: least used in the window, then least recently used, then
///   catalogue order
/// - setting change: when the window's variety score is under the threshold
/// - forbidden characters: present in every recent scene, protagonist exempt
/// - required character: the least present of the rest
/// - forbidden phrases: the most recent few
pub fn compute_variety(inputs: &VarietyInputs<'_>) -> VarietyRequirement {
    let patterns: Vec<&str> = inputs.recent.iter().map(|r| r.pattern.as_str()).collect();
    let score = variety_score(&patterns);

    let (forbidden_characters, required_characters) = cast_constraints(inputs);
    let skip = inputs
        .recent_phrases
        .len()
        .saturating_sub(FORBIDDEN_PHRASE_LIMIT);

    VarietyRequirement {
        scene_type: next_scene_type(inputs.recent).to_string(),
        change_setting: score < inputs.threshold,
        required_characters,
        forbidden_characters,
        forbidden_phrases: inputs.recent_phrases[skip..].to_vec(),
    }
}

fn next_scene_type(recent: &[SceneStructureRecord]) -> &'static str {
    SCENE_TYPES
        .iter()
        .enumerate()
        .min_by_key(|(order, scene_type)| {
            let uses = recent
                .iter()
                .filter(|r| r.scene_type.eq_ignore_ascii_case(scene_type))
                .count();
            // 0 = never used, otherwise 1 + position of last use
            let recency = recent
                .iter()
                .rposition(|r| r.scene_type.eq_ignore_ascii_case(scene_type))
                .map_or(0, |p| p + 1);
            (uses, recency, *order)
        })
        .map_or(SCENE_TYPES[0], |(_, t)| *t)
}

fn protagonist(characters: &[Character]) -> Option<&Character> {
    characters
        .iter()
        .find(|c| c.role.to_lowercase().contains("protagonist"))
        .or_else(|| characters.first())
}

fn appears_in(character: &Character, text: &str) -> bool {
    !character.name.is_empty() && text.to_lowercase().contains(&character.name.to_lowercase())
}

fn cast_constraints(inputs: &VarietyInputs<'_>) -> (Vec<String>, Vec<String>) {
    if inputs.recent_scenes.len() < 2 || inputs.characters.len() < 2 {
        return (Vec::new(), Vec::new());
    }
    let lead = protagonist(inputs.characters).map(|c| c.identifier.as_str());

    let appearances: Vec<(&Character, usize)> = inputs
        .characters
        .iter()
        .map(|c| {
            let count = inputs
                .recent_scenes
                .iter()
                .filter(|scene| appears_in(c, scene))
                .count();
            (c, count)
        })
        .collect();

    let forbidden: Vec<String> = appearances
        .iter()
        .filter(|(c, count)| {
            *count == inputs.recent_scenes.len() && Some(c.identifier.as_str()) != lead
        })
        .map(|(c, _)| c.name.clone())
        .collect();

    let required: Vec<String> = appearances
        .iter()
        .filter(|(c, _)| !forbidden.contains(&c.name))
        .min_by_key(|(_, count)| *count)
        .map(|(c, _)| vec![c.name.clone()])
        .unwrap_or_default();

    (forbidden, required)
}
