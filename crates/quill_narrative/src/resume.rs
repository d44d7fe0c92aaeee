//! Rebuilding a run from the store.
//!
//! Nothing about the engine is checkpointed. On restart the next scene is
//! derived from the store alone: the highest written `(chapter, scene)`
//! plus one, rolling into the next chapter when the current one is done.

use quill_core::{
    Chapter, Character, Location, PlotThread, Relationship, StateDelta, Story, WorkingState,
    WorldElement,
};
use quill_error::QuillResult;
use quill_interface::StoryStore;

/// Everything needed to continue a stored run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumePoint {
    /// Stored story config
    pub story: Story,
    /// Stored world
    pub world: Vec<WorldElement>,
    /// Stored cast
    pub characters: Vec<Character>,
    /// Stored relationships
    pub relationships: Vec<Relationship>,
    /// Stored plot threads
    pub plot_threads: Vec<PlotThread>,
    /// Stored chapters with their scenes
    pub chapters: Vec<Chapter>,
    /// Highest scene with content
    pub last_written: Option<Location>,
    /// Next scene to write
    pub cursor: Location,
    /// True if every planned scene has content
    pub finished: bool,
}

impl ResumePoint {
    /// Derive the resume point, or `None` if the store holds no story.
    ///
    /// # Errors
    ///
    /// Returns an error if any store read fails.
    #[tracing::instrument(skip_all, fields(backend = store.backend_name()))]
    pub async fn derive(store: &dyn StoryStore) -> QuillResult<Option<Self>> {
        let Some(story) = store.load_story().await? else {
            tracing::debug!("No stored story, starting fresh");
            return Ok(None);
        };
        let chapters = store.list_chapters().await?;
        let last_written = store.latest_written_location().await?;
        let (cursor, finished) = next_cursor(&chapters, last_written);

        let point = Self {
            story,
            world: store.list_world_elements().await?,
            characters: store.list_characters().await?,
            relationships: store.list_relationships().await?,
            plot_threads: store.list_plot_threads().await?,
            chapters,
            last_written,
            cursor,
            finished,
        };
        tracing::info!(
            cursor = %point.cursor,
            finished = point.finished,
            chapters = point.chapters.len(),
            written = point.written_scenes(),
            "Derived resume point"
        );
        Ok(Some(point))
    }

    /// Scenes with content.
    pub fn written_scenes(&self) -> usize {
        self.chapters
            .iter()
            .flat_map(|c| &c.scenes)
            .filter(|s| s.is_written())
            .count()
    }

    /// Scenes planned.
    pub fn planned_scenes(&self) -> usize {
        self.chapters.iter().map(|c| c.scenes.len()).sum()
    }

    /// The delta that loads this point into working state.
    pub fn into_delta(self) -> StateDelta {
        StateDelta::Resumed {
            story: self.story,
            world: self.world,
            characters: self.characters,
            relationships: self.relationships,
            plot_threads: self.plot_threads,
            chapters: self.chapters,
            cursor: self.cursor,
            finished: self.finished,
        }
    }
}

fn next_cursor(chapters: &[Chapter], last_written: Option<Location>) -> (Location, bool) {
    let plan = WorkingState {
        chapters: chapters.to_vec(),
        ..Default::default()
    };
    match last_written {
        None => {
            let first = plan
                .planned_locations()
                .first()
                .copied()
                .unwrap_or_else(Location::first);
            (first, false)
        }
        Some(last) => match plan.next_location(last) {
            Some(next) => (next, false),
            None => (last, true),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::Scene;

    fn plan(written: &[(u32, u32)]) -> Vec<Chapter> {
        (1..=2)
            .map(|c| {
                let mut chapter = Chapter::new(c, format!("Chapter {}", c), "");
                for s in 1..=2 {
                    let content = written.contains(&(c, s)).then(|| "text".to_string());
                    chapter.upsert_scene(Scene {
                        number: s,
                        outline: String::new(),
                        content,
                    });
                }
                chapter
            })
            .collect()
    }

    #[test]
    fn nothing_written_starts_at_first_scene() {
        assert_eq!(next_cursor(&plan(&[]), None), (Location::new(1, 1), false));
    }

    #[test]
    fn end_of_chapter_rolls_over() {
        let chapters = plan(&[(1, 1), (1, 2)]);
        assert_eq!(
            next_cursor(&chapters, Some(Location::new(1, 2))),
            (Location::new(2, 1), false)
        );
    }

    #[test]
    fn last_scene_written_is_finished() {
        let chapters = plan(&[(1, 1), (1, 2), (2, 1), (2, 2)]);
        assert_eq!(
            next_cursor(&chapters, Some(Location::new(2, 2))),
            (Location::new(2, 2), true)
        );
    }
}
