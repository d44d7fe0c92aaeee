//! Shared test doubles for narrative integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use quill_core::{GenerateRequest, GenerateResponse, StorySeed};
use quill_error::{GeneratorError, GeneratorErrorKind, QuillResult};
use quill_interface::ContentGenerator;
use serde_json::json;
use std::sync::Mutex;

/// Deterministic generator that answers by schema name.
///
/// Free-text requests for a scene reply with `Scene <c.s> prose.` so the
/// compiled document can be checked for order, naming any character the
/// prompt asks to feature so drafts pass the variety check. Continuity
/// rewrites reply with `Scene <c.s> prose, corrected.`
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    pub chapters: usize,
    pub scenes: usize,
    /// Every critique asks for revision
    reject_reflections: bool,
    /// Every call fails with a transport error
    fail_all: bool,
    /// Scene updates teach Mara a secret and reveal it to Tobin
    reveal_secret: bool,
    /// Issue locations reported by the first continuity review
    pending_issues: Mutex<Vec<(u32, u32)>>,
    calls: Mutex<Vec<String>>,
}

/// Secret taught and revealed in the same scene by [`ScriptedGenerator::revealing`].
pub const LEARNED_SECRET: &str = "The lighthouse key is missing";

impl ScriptedGenerator {
    pub fn new(chapters: usize, scenes: usize) -> Self {
        Self {
            chapters,
            scenes,
            ..Default::default()
        }
    }

    /// Critiques never approve a draft.
    pub fn rejecting(chapters: usize, scenes: usize) -> Self {
        Self {
            reject_reflections: true,
            ..Self::new(chapters, scenes)
        }
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Default::default()
        }
    }

    /// Character updates teach and reveal [`LEARNED_SECRET`].
    pub fn revealing(chapters: usize, scenes: usize) -> Self {
        Self {
            reveal_secret: true,
            ..Self::new(chapters, scenes)
        }
    }

    /// The first continuity review reports one issue per location.
    pub fn with_continuity_issues(self, locations: &[(u32, u32)]) -> Self {
        Self {
            pending_issues: Mutex::new(locations.to_vec()),
            ..self
        }
    }

    /// Schema names requested so far; free text is recorded as `text`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, schema: &str) -> usize {
        self.calls().iter().filter(|c| *c == schema).count()
    }

    fn continuity(&self) -> serde_json::Value {
        let pending = self
            .pending_issues
            .lock()
            .map(|mut p| std::mem::take(&mut *p))
            .unwrap_or_default();
        json!({
            "issues": pending
                .iter()
                .map(|(chapter, scene)| json!({
                    "chapter": chapter,
                    "scene": scene,
                    "description": "the boat changes colour"
                }))
                .collect::<Vec<_>>()
        })
    }

    fn character_update(&self) -> serde_json::Value {
        if !self.reveal_secret {
            return json!({"arcs": []});
        }
        json!({
            "arcs": [],
            "knowledge": [
                {"character": "mara", "fact": LEARNED_SECRET, "visibility": "secret"}
            ],
            "reveals": [
                {"character": "mara", "fact": LEARNED_SECRET, "to": ["tobin"]}
            ]
        })
    }

    fn structured(&self, schema: &str) -> serde_json::Value {
        match schema {
            "outline" => json!({
                "title": "The Glass Coast",
                "outline": "Mara hunts the forger who framed her brother.",
                "plot_threads": [
                    {"name": "the forgery", "description": "Who forged the deed?", "importance": "major"}
                ]
            }),
            "world" => json!({
                "elements": [
                    {"name": "Saltmarsh", "category": "town", "description": "A fishing town."}
                ]
            }),
            "cast" => json!({
                "characters": [
                    {"identifier": "mara", "name": "Mara", "role": "protagonist"},
                    {"identifier": "tobin", "name": "Tobin", "role": "rival"}
                ],
                "relationships": [
                    {"a": "tobin", "b": "mara", "description": "old rivals"}
                ],
                "secrets": [
                    {"character": "tobin", "fact": "Tobin forged the deed"}
                ]
            }),
            "chapters" => json!({
                "chapters": (1..=self.chapters)
                    .map(|n| json!({"title": format!("Part {}", n), "outline": "..."}))
                    .collect::<Vec<_>>()
            }),
            "chapter_plan" => json!({
                "scenes": (1..=self.scenes)
                    .map(|n| json!({"outline": format!("beat {}", n)}))
                    .collect::<Vec<_>>()
            }),
            "scene_brief" => json!({
                "summary": "Mara confronts Tobin.",
                "characters": ["mara", "tobin"],
                "progression_keys": ["first_confrontation"]
            }),
            "critique" => json!({
                "needs_revision": self.reject_reflections,
                "issues": if self.reject_reflections { vec!["too flat"] } else { vec![] },
                "scene_type": "confrontation",
                "pattern": "argument-escalation",
                "phrases": ["salt-stiff air"]
            }),
            "world_update" => json!({"new_elements": [], "plot_threads": []}),
            "character_update" => self.character_update(),
            "continuity" => self.continuity(),
            other => json!({"unexpected": other}),
        }
    }
}

fn scene_marker(prompt: &str) -> Option<&str> {
    ["Write scene ", "Revise scene ", "Scene "]
        .iter()
        .find_map(|marker| prompt.find(marker).map(|i| &prompt[i + marker.len()..]))
        .and_then(|rest| rest.split_whitespace().next())
        .map(|token| token.trim_end_matches(['.', ':']))
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn generate(&self, req: &GenerateRequest) -> QuillResult<GenerateResponse> {
        let schema = req.schema.clone().unwrap_or_else(|| "text".to_string());
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(schema.clone());
        }
        if self.fail_all {
            return Err(GeneratorError::new(GeneratorErrorKind::Transport(
                "scripted outage".into(),
            ))
            .into());
        }
        if schema == "text" {
            let prompt = req.messages.last().map(|m| m.content.as_str()).unwrap_or("");
            let location = scene_marker(prompt).unwrap_or("?");
            let featured = prompt
                .lines()
                .find_map(|l| l.strip_prefix("Feature: "))
                .map(|names| format!(" {} was there.", names))
                .unwrap_or_default();
            if prompt.contains("has a continuity error") {
                return Ok(GenerateResponse::text(format!(
                    "Scene {} prose, corrected.",
                    location
                )));
            }
            return Ok(GenerateResponse::text(format!(
                "Scene {} prose.{}",
                location, featured
            )));
        }
        let body = self.structured(&schema).to_string();
        Ok(GenerateResponse::text(format!("```json\n{}\n```", body)))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

pub fn seed() -> StorySeed {
    StorySeed::builder()
        .genre("mystery")
        .tone("brooding")
        .premise("A forged deed sends a fisherman's sister after the forger.")
        .build()
        .unwrap()
}
