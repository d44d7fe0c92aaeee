//! Story, chapter and scene entities.

use crate::Location;
use serde::{Deserialize, Serialize};

/// Driver-supplied parameters for a new run.
///
/// # Examples
///
/// ```
/// use quill_core::StorySeed;
///
/// let seed = StorySeed::builder()
///     .genre("mystery")
///     .tone("wry")
///     .premise("A lighthouse keeper finds a letter addressed to herself.")
///     .build()
///     .unwrap();
/// assert_eq!(seed.language(), "English");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct StorySeed {
    /// Genre label (e.g. "mystery")
    genre: String,
    /// Overall tone
    tone: String,
    /// Author whose style the prose should imitate
    #[builder(default)]
    author_style: String,
    /// Target language of the prose
    #[builder(default = "\"English\".to_string()")]
    language: String,
    /// Initial premise
    premise: String,
}

impl StorySeed {
    /// Creates a new seed builder.
    pub fn builder() -> StorySeedBuilder {
        StorySeedBuilder::default()
    }
}

/// Singleton story configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Story {
    /// Working title
    pub title: String,
    /// Genre label
    pub genre: String,
    /// Overall tone
    pub tone: String,
    /// Author style to imitate
    pub author_style: String,
    /// Prose language
    pub language: String,
    /// Initial premise
    pub premise: String,
    /// Global outline text, absent until brainstorming completes
    pub outline: Option<String>,
}

impl Story {
    /// A story carrying the seed's settings and no outline yet.
    pub fn from_seed(seed: &StorySeed) -> Self {
        Self {
            title: String::new(),
            genre: seed.genre().clone(),
            tone: seed.tone().clone(),
            author_style: seed.author_style().clone(),
            language: seed.language().clone(),
            premise: seed.premise().clone(),
            outline: None,
        }
    }

    /// True once an outline has been brainstormed.
    pub fn has_outline(&self) -> bool {
        self.outline.as_deref().is_some_and(|o| !o.trim().is_empty())
    }
}

/// A scene slot within a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// 1-based scene number, unique within its chapter
    pub number: u32,
    /// Planned beat for the scene
    pub outline: String,
    /// Prose, absent until written
    pub content: Option<String>,
}

impl Scene {
    /// A planned scene with no prose.
    pub fn planned(number: u32, outline: impl Into<String>) -> Self {
        Self {
            number,
            outline: outline.into(),
            content: None,
        }
    }

    /// True once prose has been stored for this scene.
    pub fn is_written(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// A chapter and its ordered scenes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// 1-based chapter number, unique within the story
    pub number: u32,
    /// Chapter title
    pub title: String,
    /// Chapter-level outline
    pub outline: String,
    /// Scenes in ascending scene number
    pub scenes: Vec<Scene>,
}

impl Chapter {
    /// A chapter with no scenes planned yet.
    pub fn new(number: u32, title: impl Into<String>, outline: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            outline: outline.into(),
            scenes: Vec::new(),
        }
    }

    /// Look up a scene by number.
    pub fn scene(&self, number: u32) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.number == number)
    }

    /// Mutable lookup of a scene by number.
    pub fn scene_mut(&mut self, number: u32) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.number == number)
    }

    /// Insert or replace a scene, keeping scenes sorted by number.
    pub fn upsert_scene(&mut self, scene: Scene) {
        match self.scenes.iter_mut().find(|s| s.number == scene.number) {
            Some(existing) => *existing = scene,
            None => {
                self.scenes.push(scene);
                self.scenes.sort_by_key(|s| s.number);
            }
        }
    }

    /// Locations of every scene in this chapter.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.scenes
            .iter()
            .map(move |s| Location::new(self.number, s.number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_scene_replaces_in_place() {
        let mut chapter = Chapter::new(1, "Arrival", "");
        chapter.upsert_scene(Scene::planned(2, "second"));
        chapter.upsert_scene(Scene::planned(1, "first"));
        chapter.upsert_scene(Scene {
            number: 2,
            outline: "second".into(),
            content: Some("Prose.".into()),
        });

        assert_eq!(chapter.scenes.len(), 2);
        assert_eq!(chapter.scenes[0].number, 1);
        assert!(chapter.scene(2).unwrap().is_written());
    }

    #[test]
    fn blank_outline_is_not_an_outline() {
        let story = Story {
            outline: Some("   ".into()),
            ..Default::default()
        };
        assert!(!story.has_outline());
    }
}
