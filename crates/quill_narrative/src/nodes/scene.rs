//! Nodes of the per-scene loop: brief, draft, critique and revision.

use super::{Node, NodeName, prompts, scenes_before};
use crate::{NodeContext, ResponseSchema, VarietyInputs, check_compliance, compute_variety};
use async_trait::async_trait;
use quill_core::{
    Reflection, SceneBrief, SceneDraft, SceneStage, SceneStructureRecord, StateDelta,
    VarietyRequirement, WorkingState,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BriefResponse {
    summary: String,
    #[serde(default)]
    characters: Vec<String>,
    #[serde(default)]
    progression_keys: Vec<String>,
}

const BRIEF: ResponseSchema = ResponseSchema::new("scene_brief", &["summary"]);

/// Brief for the scene under the cursor, with a variety requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrainstormSceneNode;

impl BrainstormSceneNode {
    async fn requirement(state: &WorkingState, ctx: &mut NodeContext) -> VarietyRequirement {
        let window = *ctx.config.variety_window();
        let recent = match ctx.ledger.detailed(window).await {
            Ok(recent) => recent,
            Err(e) => {
                ctx.ledger_failed(&e, "no structure history");
                Vec::new()
            }
        };
        let phrases = match ctx.ledger.recent_phrases(*ctx.config.phrase_context_limit()).await {
            Ok(phrases) => phrases,
            Err(e) => {
                ctx.ledger_failed(&e, "no phrase history");
                Vec::new()
            }
        };
        let scenes: Vec<&str> = scenes_before(state, state.cursor, window)
            .into_iter()
            .map(|(_, text)| text)
            .collect();
        compute_variety(&VarietyInputs {
            recent: &recent,
            recent_scenes: &scenes,
            characters: &state.characters,
            recent_phrases: &phrases,
            threshold: *ctx.config.variety_threshold(),
        })
    }
}

#[async_trait]
impl Node for BrainstormSceneNode {
    fn name(&self) -> NodeName {
        NodeName::BrainstormScene
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let location = state.cursor;
        let outline = state
            .current_chapter()
            .and_then(|c| c.scene(location.scene))
            .map(|s| s.outline.clone())
            .unwrap_or_default();
        let requirement = Self::requirement(state, ctx).await;
        tracing::debug!(
            scene_type = %requirement.scene_type,
            change_setting = requirement.change_setting,
            "Variety requirement"
        );

        let recent = scenes_before(state, location, 1);
        let prompt = prompts::brainstorm_scene(state, &outline, &requirement, &recent);
        let brief = match ctx.generator.structured::<BriefResponse>(&prompt, &BRIEF).await {
            Ok(response) => {
                let mut keys = Vec::new();
                for key in response.progression_keys {
                    let key = key.trim().to_string();
                    if key.is_empty() || keys.contains(&key) {
                        continue;
                    }
                    match ctx.ledger.exists(&key).await {
                        Ok(true) => tracing::debug!(key = %key, "Beat already told, dropping"),
                        Ok(false) => keys.push(key),
                        Err(e) => ctx.ledger_failed(&e, "keep beat"),
                    }
                }
                SceneBrief {
                    location,
                    summary: response.summary,
                    characters: response.characters,
                    progression_keys: keys,
                    variety: Some(requirement),
                }
            }
            Err(failure) => {
                ctx.collaborator_failed(&failure, "brief from scene plan");
                SceneBrief {
                    location,
                    summary: outline,
                    characters: Vec::new(),
                    progression_keys: Vec::new(),
                    variety: Some(requirement),
                }
            }
        };
        StateDelta::SceneBrief { brief }
    }
}

/// First draft of the scene under the cursor.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteSceneNode;

#[async_trait]
impl Node for WriteSceneNode {
    fn name(&self) -> NodeName {
        NodeName::WriteScene
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let location = state.cursor;
        let brief = state.brief.clone().unwrap_or_else(|| SceneBrief {
            location,
            summary: String::new(),
            characters: Vec::new(),
            progression_keys: Vec::new(),
            variety: None,
        });
        let avoid = match ctx.ledger.recent_phrases(*ctx.config.phrase_context_limit()).await {
            Ok(phrases) => phrases,
            Err(e) => {
                ctx.ledger_failed(&e, "no avoid-list");
                Vec::new()
            }
        };
        let previous = scenes_before(state, location, 1).first().map(|(_, text)| *text);
        let prompt = prompts::write_scene(state, &brief, &avoid, previous);

        let draft = match ctx.generator.text(&prompt).await {
            Ok(content) => SceneDraft {
                location,
                content,
                placeholder: false,
            },
            Err(failure) => {
                ctx.collaborator_failed(&failure, "placeholder prose");
                SceneDraft {
                    location,
                    content: format!("[Scene {}: {}]", location, brief.summary.trim()),
                    placeholder: true,
                }
            }
        };
        tracing::info!(%location, words = draft.content.split_whitespace().count(), "Scene drafted");
        let chapters = state
            .chapters_with_content(location, &draft.content)
            .unwrap_or_else(|| state.chapters.clone());
        StateDelta::SceneDraft {
            draft,
            chapters,
            revision_attempts: 0,
            stage: SceneStage::Written,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CritiqueResponse {
    needs_revision: bool,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    scene_type: String,
    #[serde(default)]
    opening: String,
    #[serde(default)]
    climax: String,
    #[serde(default)]
    resolution: String,
    #[serde(default)]
    pattern: String,
    #[serde(default)]
    phrases: Vec<String>,
}

const CRITIQUE: ResponseSchema = ResponseSchema::new("critique", &["needs_revision", "issues"]);

/// Critique the draft; accept it into the ledger when no revision follows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectNode;

impl ReflectNode {
    async fn record_accepted(
        state: &WorkingState,
        ctx: &mut NodeContext,
        critique: Option<&CritiqueResponse>,
    ) {
        let location = state.cursor;
        let planned_type = state
            .brief
            .as_ref()
            .and_then(|b| b.variety.as_ref())
            .map(|v| v.scene_type.clone())
            .unwrap_or_else(|| "unknown".to_string());
        let pick = |s: Option<&String>, fallback: &str| {
            s.filter(|s| !s.trim().is_empty())
                .map_or_else(|| fallback.to_string(), |s| s.trim().to_lowercase())
        };
        let scene_type = pick(critique.map(|c| &c.scene_type), &planned_type);
        let record = SceneStructureRecord {
            location,
            pattern: pick(critique.map(|c| &c.pattern), &scene_type),
            scene_type,
            opening: critique.map(|c| c.opening.clone()).unwrap_or_default(),
            climax: critique.map(|c| c.climax.clone()).unwrap_or_default(),
            resolution: critique.map(|c| c.resolution.clone()).unwrap_or_default(),
        };
        if let Err(e) = ctx.ledger.record_structure(&record).await {
            ctx.summary.persistence_failures += 1;
            tracing::warn!(error = %e, %location, "Could not record scene structure");
        }
        if let Some(critique) = critique
            && let Err(e) = ctx
                .ledger
                .add_phrases(location, "signature", &critique.phrases)
                .await
        {
            ctx.summary.persistence_failures += 1;
            tracing::warn!(error = %e, %location, "Could not record phrases");
        }
        ctx.summary.scenes_written += 1;
    }
}

#[async_trait]
impl Node for ReflectNode {
    fn name(&self) -> NodeName {
        NodeName::Reflect
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let Some(draft) = &state.draft else {
            tracing::warn!(location = %state.cursor, "Nothing to reflect on");
            return StateDelta::Reflection {
                reflection: Reflection::clean(),
                stage: SceneStage::Accepted,
            };
        };
        if draft.placeholder {
            tracing::debug!(location = %draft.location, "Placeholder draft accepted without review");
            Self::record_accepted(state, ctx, None).await;
            return StateDelta::Reflection {
                reflection: Reflection::clean(),
                stage: SceneStage::Accepted,
            };
        }

        let critique = match ctx
            .generator
            .structured::<CritiqueResponse>(&prompts::reflect(state, &draft.content), &CRITIQUE)
            .await
        {
            Ok(critique) => Some(critique),
            Err(failure) => {
                ctx.collaborator_failed(&failure, "no issues found");
                None
            }
        };

        let mut reflection = critique
            .as_ref()
            .map(|c| Reflection {
                needs_revision: c.needs_revision,
                issues: c.issues.clone(),
            })
            .unwrap_or_else(Reflection::clean);
        if let Some(requirement) = state.brief.as_ref().and_then(|b| b.variety.as_ref()) {
            let (compliant, issues) = check_compliance(&draft.content, requirement);
            if !compliant {
                reflection.needs_revision = true;
                reflection.issues.extend(issues);
            }
        }

        let max = *ctx.config.max_regeneration_attempts();
        let revise = reflection.needs_revision && state.revision_attempts < max;
        let stage = if revise {
            tracing::info!(
                location = %draft.location,
                attempt = state.revision_attempts + 1,
                issues = reflection.issues.len(),
                "Scene needs revision"
            );
            SceneStage::Reflected
        } else {
            if reflection.needs_revision {
                ctx.summary.forced_accepts += 1;
                tracing::warn!(
                    location = %draft.location,
                    attempts = state.revision_attempts,
                    issues = reflection.issues.len(),
                    "Revision limit reached, accepting scene as is"
                );
            }
            Self::record_accepted(state, ctx, critique.as_ref()).await;
            SceneStage::Accepted
        };
        StateDelta::Reflection { reflection, stage }
    }
}

/// Rewrite the draft against the critique.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviseSceneNode;

#[async_trait]
impl Node for ReviseSceneNode {
    fn name(&self) -> NodeName {
        NodeName::ReviseScene
    }

    async fn run(&self, state: &WorkingState, ctx: &mut NodeContext) -> StateDelta {
        let Some(draft) = state.draft.clone() else {
            tracing::warn!(location = %state.cursor, "Nothing to revise");
            return StateDelta::Unchanged;
        };
        let reflection = state.reflection.clone().unwrap_or_default();
        let attempts = state.revision_attempts + 1;

        let draft = match ctx
            .generator
            .text(&prompts::revise(state, &draft.content, &reflection))
            .await
        {
            Ok(content) => SceneDraft { content, ..draft },
            Err(failure) => {
                ctx.collaborator_failed(&failure, "keep draft");
                draft
            }
        };
        let chapters = state
            .chapters_with_content(draft.location, &draft.content)
            .unwrap_or_else(|| state.chapters.clone());
        StateDelta::SceneDraft {
            draft,
            chapters,
            revision_attempts: attempts,
            stage: SceneStage::Revised,
        }
    }
}
