//! Prompt text for each node.

use quill_core::{
    Chapter, ContinuityIssue, Location, Reflection, SceneBrief, Story, VarietyRequirement,
    WorkingState,
};
use std::fmt::Write;

fn story_header(story: &Story) -> String {
    let mut out = String::new();
    if !story.title.is_empty() {
        let _ = writeln!(out, "Title: {}", story.title);
    }
    let _ = writeln!(out, "Genre: {}", story.genre);
    let _ = writeln!(out, "Tone: {}", story.tone);
    if !story.author_style.is_empty() {
        let _ = writeln!(out, "Write in the style of: {}", story.author_style);
    }
    let _ = writeln!(out, "Language: {}", story.language);
    out
}

fn outline_section(story: &Story) -> String {
    match story.outline.as_deref() {
        Some(outline) => format!("\nStory outline:\n{}\n", outline),
        None => format!("\nPremise:\n{}\n", story.premise),
    }
}

fn cast_section(state: &WorkingState) -> String {
    if state.characters.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nCharacters:\n");
    for c in &state.characters {
        let _ = writeln!(out, "- {} [{}] ({}): {}", c.name, c.identifier, c.role, c.profile);
    }
    out
}

fn world_section(state: &WorkingState) -> String {
    if state.world.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nWorld:\n");
    for e in &state.world {
        let _ = writeln!(out, "- {} ({}): {}", e.name, e.category, e.description);
    }
    out
}

fn variety_section(requirement: &VarietyRequirement) -> String {
    let mut out = format!("\nThis must be a {} scene.\n", requirement.scene_type);
    if requirement.change_setting {
        out.push_str("Move the action to a setting not used in the last few scenes.\n");
    }
    if !requirement.required_characters.is_empty() {
        let _ = writeln!(out, "Feature: {}", requirement.required_characters.join(", "));
    }
    if !requirement.forbidden_characters.is_empty() {
        let _ = writeln!(out, "Leave out: {}", requirement.forbidden_characters.join(", "));
    }
    out
}

pub(super) fn brainstorm(state: &WorkingState) -> String {
    format!(
        "{}\nPremise:\n{}\n\nInvent a title, a chapter-by-chapter story outline, and the \
         main plot threads (name, description, importance: major, minor or background).",
        story_header(&state.story),
        state.story.premise
    )
}

pub(super) fn build_world(state: &WorkingState) -> String {
    format!(
        "{}{}\nList the places, factions, objects and rules this story needs. \
         Give each a name, a category and a description.",
        story_header(&state.story),
        outline_section(&state.story)
    )
}

pub(super) fn create_characters(state: &WorkingState) -> String {
    format!(
        "{}{}{}\nCreate the cast. For each character give a short lowercase identifier, \
         name, role, profile, motivation and arc. Also list relationships between pairs \
         of identifiers, and secrets each character keeps.",
        story_header(&state.story),
        outline_section(&state.story),
        world_section(state)
    )
}

pub(super) fn plan_chapters(state: &WorkingState, chapters: u32) -> String {
    format!(
        "{}{}\nSplit the story into about {} chapters. Give each a title and an outline.",
        story_header(&state.story),
        outline_section(&state.story),
        chapters
    )
}

pub(super) fn plan_chapter(state: &WorkingState, chapter: &Chapter, scenes: u32) -> String {
    format!(
        "{}{}{}\nChapter {}: {}\n{}\n\nBreak this chapter into about {} scenes, each with a \
         one-paragraph outline.",
        story_header(&state.story),
        outline_section(&state.story),
        cast_section(state),
        chapter.number,
        chapter.title,
        chapter.outline,
        scenes
    )
}

pub(super) fn brainstorm_scene(
    state: &WorkingState,
    outline: &str,
    requirement: &VarietyRequirement,
    recent: &[(Location, &str)],
) -> String {
    let mut out = format!(
        "{}{}{}\nScene {} outline:\n{}\n{}",
        story_header(&state.story),
        cast_section(state),
        world_section(state),
        state.cursor,
        outline,
        variety_section(requirement)
    );
    if let Some((location, text)) = recent.last() {
        let _ = write!(out, "\nPrevious scene ({}) ended:\n{}\n", location, tail(text, 600));
    }
    out.push_str(
        "\nPlan the scene: a summary, the identifiers of the characters present, and \
         short keys for any one-time story beats that happen in it.",
    );
    out
}

pub(super) fn write_scene(
    state: &WorkingState,
    brief: &SceneBrief,
    avoid: &[String],
    previous: Option<&str>,
) -> String {
    let mut out = format!(
        "{}{}{}\nWrite scene {}.\n\nPlan:\n{}\n",
        story_header(&state.story),
        cast_section(state),
        world_section(state),
        brief.location,
        brief.summary
    );
    if let Some(requirement) = &brief.variety {
        out.push_str(&variety_section(requirement));
    }
    let banned: Vec<&String> = avoid
        .iter()
        .chain(brief.variety.iter().flat_map(|v| v.forbidden_phrases.iter()))
        .collect();
    if !banned.is_empty() {
        out.push_str("\nDo not use these phrases:\n");
        for phrase in banned {
            let _ = writeln!(out, "- {}", phrase);
        }
    }
    if let Some(previous) = previous {
        let _ = write!(out, "\nThe previous scene ended:\n{}\n", tail(previous, 600));
    }
    out.push_str("\nReturn only the prose of the scene.");
    out
}

pub(super) fn reflect(state: &WorkingState, content: &str) -> String {
    format!(
        "{}\nCritique this scene for pacing, clarity and consistency with the story. \
         Say whether it needs revision and list concrete issues. Also describe its \
         structure: scene type, opening, climax, resolution, a short pattern label, and \
         any distinctive phrases it uses.\n\nScene {}:\n{}",
        story_header(&state.story),
        state.cursor,
        content
    )
}

pub(super) fn revise(state: &WorkingState, content: &str, reflection: &Reflection) -> String {
    let mut out = format!(
        "{}\nRevise scene {} to address these issues:\n",
        story_header(&state.story),
        state.cursor
    );
    for issue in &reflection.issues {
        let _ = writeln!(out, "- {}", issue);
    }
    let _ = write!(
        out,
        "\nOriginal scene:\n{}\n\nReturn only the revised prose.",
        content
    );
    out
}

pub(super) fn update_world(state: &WorkingState, content: &str) -> String {
    let mut out = format!("{}{}\nPlot threads:\n", story_header(&state.story), world_section(state));
    for thread in &state.plot_threads {
        let _ = writeln!(
            out,
            "- {} ({}, {}): {}",
            thread.name, thread.status, thread.importance, thread.description
        );
    }
    let _ = write!(
        out,
        "\nAfter this scene ({}):\n{}\n\nList new world elements, plot threads whose status \
         changed (introduced, developing, resolved, dormant), and one-time story beats \
         that just happened, each with a short key.",
        state.cursor, content
    );
    out
}

pub(super) fn update_characters(state: &WorkingState, content: &str) -> String {
    format!(
        "{}{}\nAfter this scene ({}):\n{}\n\nReport character arc changes, facts each \
         character learned (with visibility: secret, revealed or public), secrets that were \
         revealed and to whom, and relationship changes. Use character identifiers.",
        story_header(&state.story),
        cast_section(state),
        state.cursor,
        content
    )
}

pub(super) fn review_continuity(state: &WorkingState, scenes: &[(Location, &str)]) -> String {
    let mut out = format!("{}{}\n", story_header(&state.story), cast_section(state));
    for (location, text) in scenes {
        let _ = write!(out, "\nScene {}:\n{}\n", location, text);
    }
    out.push_str(
        "\nList continuity errors between these scenes: contradictions in facts, names, \
         timeline or character knowledge. Give the chapter and scene number to fix.",
    );
    out
}

pub(super) fn resolve_issue(state: &WorkingState, issue: &ContinuityIssue, content: &str) -> String {
    format!(
        "{}\nScene {} has a continuity error: {}\n\nRewrite the scene to fix it, changing as \
         little as possible.\n\n{}\n\nReturn only the corrected prose.",
        story_header(&state.story),
        issue.location,
        issue.description,
        content
    )
}

/// Last `max` bytes of `text`, cut on a char boundary.
fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
