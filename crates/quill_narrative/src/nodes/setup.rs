//! Nodes that run once per story: resume, outline, world, cast and plan.

use super::{Node, NodeName, prompts, slug};
use crate::{NodeContext, ResponseSchema, ResumePoint};
use async_trait::async_trait;
use quill_core::{
    Chapter, Character, Importance, KnowledgeEntry, PlotStatus, PlotThread, Relationship, Scene,
    StateDelta, Visibility, WorkingState, WorldElement,
};
use serde::Deserialize;

/// Reload a stored run, or leave a fresh state alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitializeNode;

#[async_trait]
impl Node for InitializeNode {
    fn name(&self) -> NodeName {
        NodeName::Initialize
    }

    async fn run(&self, _state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        match ResumePoint::derive(ctx.store.as_ref()).await {
            Ok(Some(point)) => point.into_delta(),
            Ok(None) => StateDelta::Unchanged,
            Err(e) => {
                ctx.summary.persistence_failures += 1;
                tracing::warn!(error = %e, fallback = "fresh run", "Could not read stored run");
                StateDelta::Unchanged
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThreadSpec {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    importance: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl ThreadSpec {
    fn into_thread(self) -> PlotThread {
        PlotThread {
            name: self.name.trim().to_string(),
            description: self.description,
            status: parse_or_default(self.status.as_deref()),
            importance: parse_or_default(self.importance.as_deref()),
        }
    }
}

pub(super) fn parse_or_default<T: std::str::FromStr + Default>(value: Option<&str>) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct OutlineResponse {
    title: String,
    outline: String,
    #[serde(default)]
    plot_threads: Vec<ThreadSpec>,
}

const OUTLINE: ResponseSchema = ResponseSchema::new("outline", &["title", "outline"]);

/// Title, outline and opening plot threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrainstormNode;

#[async_trait]
impl Node for BrainstormNode {
    fn name(&self) -> NodeName {
        NodeName::Brainstorm
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let mut story = state.story.clone();
        let result = ctx
            .generator
            .structured::<OutlineResponse>(&prompts::brainstorm(state), &OUTLINE)
            .await
            .and_then(|r| {
                if r.outline.trim().is_empty() {
                    Err(quill_error::GenerationFailure::Empty)
                } else {
                    Ok(r)
                }
            });
        let plot_threads = match result {
            Ok(response) => {
                story.title = response.title.trim().to_string();
                story.outline = Some(response.outline);
                response
                    .plot_threads
                    .into_iter()
                    .filter(|t| !t.name.trim().is_empty())
                    .map(ThreadSpec::into_thread)
                    .collect()
            }
            Err(failure) => {
                ctx.collaborator_failed(&failure, "synthetic outline from premise");
                if story.title.is_empty() {
                    story.title = "Untitled".to_string();
                }
                story.outline = Some(format!("A {} {} story. {}", story.tone, story.genre, story.premise));
                vec![PlotThread {
                    name: "main".to_string(),
                    description: story.premise.clone(),
                    status: PlotStatus::Introduced,
                    importance: Importance::Major,
                }]
            }
        };
        tracing::info!(title = %story.title, threads = plot_threads.len(), "Outline ready");
        StateDelta::Outline {
            story,
            plot_threads,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ElementSpec {
    pub(super) name: String,
    #[serde(default)]
    pub(super) category: String,
    #[serde(default)]
    pub(super) description: String,
}

/// Merge elements into `world` by name.
pub(super) fn merge_world(world: &mut Vec<WorldElement>, specs: Vec<ElementSpec>) -> usize {
    let mut changed = 0;
    for spec in specs {
        let name = spec.name.trim().to_string();
        if name.is_empty() {
            continue;
        }
        let element = WorldElement {
            name,
            category: spec.category,
            description: spec.description,
        };
        match world.iter_mut().find(|e| e.name == element.name) {
            Some(existing) if *existing == element => continue,
            Some(existing) => *existing = element,
            None => world.push(element),
        }
        changed += 1;
    }
    changed
}

#[derive(Debug, Deserialize)]
struct WorldResponse {
    elements: Vec<ElementSpec>,
}

const WORLD: ResponseSchema = ResponseSchema::new("world", &["elements"]);

/// World elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildWorldNode;

#[async_trait]
impl Node for BuildWorldNode {
    fn name(&self) -> NodeName {
        NodeName::BuildWorld
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        match ctx
            .generator
            .structured::<WorldResponse>(&prompts::build_world(state), &WORLD)
            .await
        {
            Ok(response) => {
                let mut world = state.world.clone();
                let added = merge_world(&mut world, response.elements);
                tracing::info!(added, "World built");
                StateDelta::World {
                    world,
                    plot_threads: None,
                }
            }
            Err(failure) => {
                ctx.collaborator_failed(&failure, "empty world");
                StateDelta::Unchanged
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CharacterSpec {
    #[serde(default)]
    identifier: String,
    name: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    profile: String,
    #[serde(default)]
    motivation: String,
    #[serde(default)]
    arc: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct RelationshipSpec {
    pub(super) a: String,
    pub(super) b: String,
    #[serde(default)]
    pub(super) description: String,
}

#[derive(Debug, Deserialize)]
struct SecretSpec {
    character: String,
    fact: String,
}

#[derive(Debug, Deserialize)]
struct CastResponse {
    characters: Vec<CharacterSpec>,
    #[serde(default)]
    relationships: Vec<RelationshipSpec>,
    #[serde(default)]
    secrets: Vec<SecretSpec>,
}

const CAST: ResponseSchema = ResponseSchema::new("cast", &["characters"]);

/// Merge relationships by unordered pair, dropping pairs with an unknown or
/// repeated member.
pub(super) fn merge_relationships(
    relationships: &mut Vec<Relationship>,
    characters: &[Character],
    specs: Vec<RelationshipSpec>,
) {
    let known = |id: &str| characters.iter().any(|c| c.identifier == id);
    for spec in specs {
        let (a, b) = (slug(&spec.a), slug(&spec.b));
        if a == b || !known(&a) || !known(&b) {
            tracing::debug!(a = %a, b = %b, "Skipping relationship with unknown member");
            continue;
        }
        let relationship = Relationship::new(a, b, spec.description);
        match relationships
            .iter_mut()
            .find(|r| r.key() == relationship.key())
        {
            Some(existing) => existing.description = relationship.description,
            None => relationships.push(relationship),
        }
    }
}

/// Cast, relationships and starting secrets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateCharactersNode;

#[async_trait]
impl Node for CreateCharactersNode {
    fn name(&self) -> NodeName {
        NodeName::CreateCharacters
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let mut characters = state.characters.clone();
        let mut relationships = state.relationships.clone();
        let mut knowledge_updates = Vec::new();

        let response = ctx
            .generator
            .structured::<CastResponse>(&prompts::create_characters(state), &CAST)
            .await
            .and_then(|r| {
                if r.characters.is_empty() {
                    Err(quill_error::GenerationFailure::Empty)
                } else {
                    Ok(r)
                }
            });

        match response {
            Ok(cast) => {
                for spec in cast.characters {
                    let identifier = match slug(&spec.identifier) {
                        id if id.is_empty() => slug(&spec.name),
                        id => id,
                    };
                    if identifier.is_empty() {
                        continue;
                    }
                    let character = Character {
                        identifier,
                        name: spec.name.trim().to_string(),
                        role: spec.role,
                        profile: spec.profile,
                        motivation: spec.motivation,
                        arc: spec.arc,
                    };
                    match characters
                        .iter_mut()
                        .find(|c| c.identifier == character.identifier)
                    {
                        Some(existing) => *existing = character,
                        None => characters.push(character),
                    }
                }
                merge_relationships(&mut relationships, &characters, cast.relationships);
                for secret in cast.secrets {
                    let character = slug(&secret.character);
                    if !characters.iter().any(|c| c.identifier == character) {
                        continue;
                    }
                    knowledge_updates.push(KnowledgeEntry {
                        character,
                        fact: secret.fact,
                        visibility: Visibility::Secret,
                        source: "backstory".to_string(),
                        location: state.cursor,
                    });
                }
            }
            Err(failure) => {
                ctx.collaborator_failed(&failure, "single protagonist");
                if characters.is_empty() {
                    characters.push(Character {
                        identifier: "protagonist".to_string(),
                        name: "The Protagonist".to_string(),
                        role: "protagonist".to_string(),
                        profile: state.story.premise.clone(),
                        ..Default::default()
                    });
                }
            }
        }

        tracing::info!(
            characters = characters.len(),
            relationships = relationships.len(),
            secrets = knowledge_updates.len(),
            "Cast ready"
        );
        StateDelta::Characters {
            characters,
            relationships,
            knowledge_updates,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChapterSpec {
    title: String,
    #[serde(default)]
    outline: String,
}

#[derive(Debug, Deserialize)]
struct ChaptersResponse {
    chapters: Vec<ChapterSpec>,
}

const CHAPTERS: ResponseSchema = ResponseSchema::new("chapters", &["chapters"]);

/// Chapter skeleton. An existing plan is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanChaptersNode;

#[async_trait]
impl Node for PlanChaptersNode {
    fn name(&self) -> NodeName {
        NodeName::PlanChapters
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        if !state.chapters.is_empty() {
            tracing::debug!(chapters = state.chapters.len(), "Chapters already planned");
            return StateDelta::Unchanged;
        }
        let target = *ctx.config.chapters();
        let chapters: Vec<Chapter> = match ctx
            .generator
            .structured::<ChaptersResponse>(&prompts::plan_chapters(state, target), &CHAPTERS)
            .await
        {
            Ok(response) if !response.chapters.is_empty() => response
                .chapters
                .into_iter()
                .zip(1u32..)
                .map(|(spec, number)| Chapter::new(number, spec.title.trim(), spec.outline))
                .collect(),
            Ok(_) => {
                ctx.collaborator_failed(&quill_error::GenerationFailure::Empty, "numbered chapters");
                placeholder_chapters(target)
            }
            Err(failure) => {
                ctx.collaborator_failed(&failure, "numbered chapters");
                placeholder_chapters(target)
            }
        };
        tracing::info!(chapters = chapters.len(), "Chapters planned");
        StateDelta::Chapters { chapters }
    }
}

fn placeholder_chapters(count: u32) -> Vec<Chapter> {
    (1..=count)
        .map(|n| Chapter::new(n, format!("Chapter {}", n), ""))
        .collect()
}

#[derive(Debug, Deserialize)]
struct SceneSpec {
    outline: String,
}

#[derive(Debug, Deserialize)]
struct ChapterPlanResponse {
    scenes: Vec<SceneSpec>,
}

const CHAPTER_PLAN: ResponseSchema = ResponseSchema::new("chapter_plan", &["scenes"]);

/// Scenes of the chapter under the cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanChapterNode;

#[async_trait]
impl Node for PlanChapterNode {
    fn name(&self) -> NodeName {
        NodeName::PlanChapter
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let Some(chapter) = state.current_chapter() else {
            tracing::warn!(chapter = state.cursor.chapter, "Cursor is outside the chapter plan");
            return StateDelta::Unchanged;
        };
        let target = *ctx.config.scenes_per_chapter();
        let outlines: Vec<String> = match ctx
            .generator
            .structured::<ChapterPlanResponse>(
                &prompts::plan_chapter(state, chapter, target),
                &CHAPTER_PLAN,
            )
            .await
        {
            Ok(response) if !response.scenes.is_empty() => {
                response.scenes.into_iter().map(|s| s.outline).collect()
            }
            Ok(_) => {
                ctx.collaborator_failed(&quill_error::GenerationFailure::Empty, "numbered scenes");
                placeholder_outlines(chapter.number, target)
            }
            Err(failure) => {
                ctx.collaborator_failed(&failure, "numbered scenes");
                placeholder_outlines(chapter.number, target)
            }
        };

        let mut chapters = state.chapters.clone();
        if let Some(planned) = chapters.iter_mut().find(|c| c.number == chapter.number) {
            for (outline, number) in outlines.into_iter().zip(1u32..) {
                let content = planned.scene(number).and_then(|s| s.content.clone());
                planned.upsert_scene(Scene {
                    number,
                    outline,
                    content,
                });
            }
            tracing::info!(chapter = planned.number, scenes = planned.scenes.len(), "Chapter planned");
        }
        StateDelta::ChapterPlan { chapters }
    }
}

fn placeholder_outlines(chapter: u32, count: u32) -> Vec<String> {
    (1..=count)
        .map(|n| format!("Scene {} of chapter {}", n, chapter))
        .collect()
}
