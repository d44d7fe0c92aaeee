//! Nodes that run after a scene is accepted, plus cursor and compile.

use super::setup::{ElementSpec, RelationshipSpec, merge_relationships, merge_world, parse_or_default};
use super::{Node, NodeName, prompts, scenes_before, slug};
use crate::{NodeContext, ResponseSchema, compile_document};
use async_trait::async_trait;
use quill_core::{
    ContinuityIssue, KnowledgeEntry, Location, PlotThread, StateDelta, Visibility, WorkingState,
};
use serde::Deserialize;

const MAX_CONTINUITY_ISSUES: usize = 3;
const CONTINUITY_WINDOW: usize = 3;

#[derive(Debug, Deserialize)]
struct ThreadUpdate {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    importance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BeatSpec {
    key: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct WorldUpdateResponse {
    #[serde(default)]
    new_elements: Vec<ElementSpec>,
    #[serde(default)]
    plot_threads: Vec<ThreadUpdate>,
    #[serde(default)]
    beats: Vec<BeatSpec>,
}

const WORLD_UPDATE: ResponseSchema =
    ResponseSchema::new("world_update", &["new_elements", "plot_threads"]);

fn merge_threads(threads: &mut Vec<PlotThread>, updates: Vec<ThreadUpdate>) {
    for update in updates {
        let name = update.name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        match threads.iter_mut().find(|t| t.name == name) {
            Some(thread) => {
                if let Some(status) = update.status.as_deref().and_then(|s| s.parse().ok()) {
                    thread.status = status;
                }
                if let Some(importance) = update.importance.as_deref().and_then(|s| s.parse().ok())
                {
                    thread.importance = importance;
                }
                if let Some(description) = update.description.filter(|d| !d.trim().is_empty()) {
                    thread.description = description;
                }
            }
            None => threads.push(PlotThread {
                name,
                description: update.description.unwrap_or_default(),
                status: parse_or_default(update.status.as_deref()),
                importance: parse_or_default(update.importance.as_deref()),
            }),
        }
    }
}

/// World and plot thread changes; one-time beats go to the ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateWorldNode;

impl UpdateWorldNode {
    async fn track(ctx: &mut NodeContext, key: &str, location: Location, description: &str) {
        match ctx.ledger.track(key, location, description).await {
            Ok(true) => tracing::debug!(key, %location, "Beat tracked"),
            Ok(false) => tracing::debug!(key, "Beat already happened"),
            Err(e) => {
                ctx.summary.persistence_failures += 1;
                tracing::warn!(key, error = %e, "Could not track beat");
            }
        }
    }
}

#[async_trait]
impl Node for UpdateWorldNode {
    fn name(&self) -> NodeName {
        NodeName::UpdateWorld
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let location = state.cursor;
        if let Some(brief) = &state.brief {
            for key in &brief.progression_keys {
                Self::track(ctx, key, location, &brief.summary).await;
            }
        }

        let Some(content) = state.scene_content(location) else {
            return StateDelta::Unchanged;
        };
        match ctx
            .generator
            .structured::<WorldUpdateResponse>(
                &prompts::update_world(state, content),
                &WORLD_UPDATE,
            )
            .await
        {
            Ok(update) => {
                for beat in &update.beats {
                    let key = beat.key.trim();
                    if !key.is_empty() {
                        Self::track(ctx, key, location, &beat.description).await;
                    }
                }
                let mut world = state.world.clone();
                let added = merge_world(&mut world, update.new_elements);
                let mut threads = state.plot_threads.clone();
                merge_threads(&mut threads, update.plot_threads);
                tracing::debug!(added, threads = threads.len(), "World updated");
                StateDelta::World {
                    world,
                    plot_threads: Some(threads),
                }
            }
            Err(failure) => {
                ctx.collaborator_failed(&failure, "no world change");
                StateDelta::Unchanged
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArcUpdate {
    identifier: String,
    arc: String,
}

#[derive(Debug, Deserialize)]
struct LearnedFact {
    character: String,
    fact: String,
    #[serde(default)]
    visibility: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RevealSpec {
    character: String,
    fact: String,
    #[serde(default)]
    to: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CharacterUpdateResponse {
    #[serde(default)]
    arcs: Vec<ArcUpdate>,
    #[serde(default)]
    knowledge: Vec<LearnedFact>,
    #[serde(default)]
    reveals: Vec<RevealSpec>,
    #[serde(default)]
    relationships: Vec<RelationshipSpec>,
}

const CHARACTER_UPDATE: ResponseSchema = ResponseSchema::new("character_update", &["arcs"]);

/// Arc changes, learned facts, reveals and relationship changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateCharactersNode;

#[async_trait]
impl Node for UpdateCharactersNode {
    fn name(&self) -> NodeName {
        NodeName::UpdateCharacters
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let location = state.cursor;
        let Some(content) = state.scene_content(location) else {
            return StateDelta::Unchanged;
        };
        let update = match ctx
            .generator
            .structured::<CharacterUpdateResponse>(
                &prompts::update_characters(state, content),
                &CHARACTER_UPDATE,
            )
            .await
        {
            Ok(update) => update,
            Err(failure) => {
                ctx.collaborator_failed(&failure, "no character change");
                return StateDelta::Unchanged;
            }
        };

        let mut characters = state.characters.clone();
        for arc in update.arcs {
            let id = slug(&arc.identifier);
            if let Some(character) = characters.iter_mut().find(|c| c.identifier == id) {
                character.arc = arc.arc;
            }
        }

        let known = |id: &str| characters.iter().any(|c| c.identifier == id);
        let knowledge_updates: Vec<KnowledgeEntry> = update
            .knowledge
            .into_iter()
            .filter_map(|learned| {
                let character = slug(&learned.character);
                known(&character).then(|| KnowledgeEntry {
                    character,
                    fact: learned.fact,
                    visibility: learned
                        .visibility
                        .as_deref()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(Visibility::Public),
                    source: format!("scene {}", location),
                    location,
                })
            })
            .collect();

        // Learned facts must be in the store before any reveal runs.
        for entry in &knowledge_updates {
            if let Err(e) = ctx.ledger.add_knowledge(entry).await {
                ctx.summary.persistence_failures += 1;
                tracing::warn!(character = %entry.character, error = %e, "Failed to record learned fact");
            }
        }

        for reveal in update.reveals {
            let character = slug(&reveal.character);
            let recipients: Vec<String> = reveal.to.iter().map(|r| slug(r)).collect();
            match ctx
                .ledger
                .reveal(&character, &reveal.fact, location, &recipients)
                .await
            {
                Ok(true) => tracing::info!(character = %character, %location, "Secret revealed"),
                Ok(false) => tracing::debug!(character = %character, "Fact was not a secret"),
                Err(e) => ctx.ledger_failed(&e, "skip reveal"),
            }
        }

        let mut relationships = state.relationships.clone();
        merge_relationships(&mut relationships, &characters, update.relationships);

        StateDelta::Characters {
            characters,
            relationships,
            knowledge_updates,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IssueSpec {
    chapter: u32,
    scene: u32,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ContinuityResponse {
    issues: Vec<IssueSpec>,
}

const CONTINUITY: ResponseSchema = ResponseSchema::new("continuity", &["issues"]);

/// Look for contradictions among the most recent scenes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewContinuityNode;

#[async_trait]
impl Node for ReviewContinuityNode {
    fn name(&self) -> NodeName {
        NodeName::ReviewContinuity
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        if !*ctx.config.continuity_review() {
            return StateDelta::ContinuityReview { issues: Vec::new() };
        }
        let next = Location::new(state.cursor.chapter, state.cursor.scene + 1);
        let scenes = scenes_before(state, next, CONTINUITY_WINDOW);
        if scenes.len() < 2 {
            return StateDelta::ContinuityReview { issues: Vec::new() };
        }

        let issues = match ctx
            .generator
            .structured::<ContinuityResponse>(
                &prompts::review_continuity(state, &scenes),
                &CONTINUITY,
            )
            .await
        {
            Ok(response) => response
                .issues
                .into_iter()
                .map(|i| ContinuityIssue {
                    location: Location::new(i.chapter, i.scene),
                    description: i.description,
                })
                .filter(|i| scenes.iter().any(|(l, _)| *l == i.location))
                .take(MAX_CONTINUITY_ISSUES)
                .collect(),
            Err(failure) => {
                ctx.collaborator_failed(&failure, "no issues");
                Vec::new()
            }
        };
        if !issues.is_empty() {
            tracing::info!(issues = issues.len(), "Continuity issues found");
        }
        StateDelta::ContinuityReview { issues }
    }
}

/// Rewrite one scene to fix the next pending continuity issue.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveIssueNode;

#[async_trait]
impl Node for ResolveIssueNode {
    fn name(&self) -> NodeName {
        NodeName::ResolveIssue
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let index = state.issue_index;
        let skip = StateDelta::IssueResolved {
            issue_index: index + 1,
            chapters: state.chapters.clone(),
            corrected: None,
        };
        let Some(issue) = state.continuity_issues.get(index) else {
            return skip;
        };
        let Some(content) = state.scene_content(issue.location) else {
            tracing::debug!(location = %issue.location, "Issue points at an unwritten scene");
            return skip;
        };

        match ctx
            .generator
            .text(&prompts::resolve_issue(state, issue, content))
            .await
        {
            Ok(fixed) => match state.chapters_with_content(issue.location, &fixed) {
                Some(chapters) => {
                    tracing::info!(location = %issue.location, index, "Continuity issue resolved");
                    StateDelta::IssueResolved {
                        issue_index: index + 1,
                        chapters,
                        corrected: Some(issue.location),
                    }
                }
                None => skip,
            },
            Err(failure) => {
                ctx.collaborator_failed(&failure, "skip issue");
                skip
            }
        }
    }
}

/// Move the cursor to the next planned scene.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvanceNode;

#[async_trait]
impl Node for AdvanceNode {
    fn name(&self) -> NodeName {
        NodeName::Advance
    }

    async fn run(&self, state: &WorkingState, _ctx: &mut NodeContext) -> StateDelta {
        match state.next_location(state.cursor) {
            Some(cursor) => {
                tracing::debug!(from = %state.cursor, to = %cursor, "Advancing");
                StateDelta::Advanced {
                    cursor,
                    finished: false,
                }
            }
            None => {
                tracing::info!(last = %state.cursor, "All planned scenes written");
                StateDelta::Advanced {
                    cursor: state.cursor,
                    finished: true,
                }
            }
        }
    }
}

/// Assemble the document from the in-memory chapters.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileNode;

#[async_trait]
impl Node for CompileNode {
    fn name(&self) -> NodeName {
        NodeName::Compile
    }

    async fn run(&self, state: &WorkingState, _ctx: &mut NodeContext) -> StateDelta {
        let document = compile_document(&state.story, &state.chapters);
        tracing::info!(bytes = document.len(), "Document compiled");
        StateDelta::Compiled { document }
    }
}
