//! Read-only views of a stored run.

use quill_core::Location;
use quill_error::QuillResult;
use quill_interface::StoryStore;
use quill_narrative::{ResumePoint, compile_document};
use serde::Serialize;

/// Progress of the run held by a store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryStatus {
    /// Stored title
    pub title: String,
    /// Whether brainstorming has produced an outline
    pub outlined: bool,
    /// Cast size
    pub characters: usize,
    /// Chapters planned
    pub chapters: usize,
    /// Scenes planned
    pub planned_scenes: usize,
    /// Scenes with content
    pub written_scenes: usize,
    /// Highest written scene
    pub last_written: Option<Location>,
    /// Scene a resumed run would write next, unless finished
    pub next: Option<Location>,
    /// Every planned scene has content
    pub finished: bool,
}

impl StoryStatus {
    /// Summarize the store, or `None` if it holds no story.
    ///
    /// # Errors
    ///
    /// Returns an error if a store read fails.
    pub async fn gather(store: &dyn StoryStore) -> QuillResult<Option<Self>> {
        let Some(point) = ResumePoint::derive(store).await? else {
            return Ok(None);
        };
        Ok(Some(Self {
            title: point.story.title.clone(),
            outlined: point.story.has_outline(),
            characters: point.characters.len(),
            chapters: point.chapters.len(),
            planned_scenes: point.planned_scenes(),
            written_scenes: point.written_scenes(),
            last_written: point.last_written,
            next: (!point.finished).then_some(point.cursor),
            finished: point.finished,
        }))
    }
}

impl std::fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title = if self.title.is_empty() { "(untitled)" } else { self.title.as_str() };
        writeln!(f, "Story:      {}", title)?;
        writeln!(f, "Outline:    {}", if self.outlined { "yes" } else { "no" })?;
        writeln!(f, "Characters: {}", self.characters)?;
        writeln!(f, "Chapters:   {}", self.chapters)?;
        writeln!(f, "Scenes:     {}/{} written", self.written_scenes, self.planned_scenes)?;
        match self.next {
            Some(next) => write!(f, "Next scene: {}", next),
            None => write!(f, "Next scene: none, ready to compile"),
        }
    }
}

/// Compile whatever the store holds into Markdown.
///
/// Returns `None` if the store holds no story.
///
/// # Errors
///
/// Returns an error if a store read fails.
pub async fn compile_stored(store: &dyn StoryStore) -> QuillResult<Option<String>> {
    let Some(story) = store.load_story().await? else {
        return Ok(None);
    };
    let chapters = store.list_chapters().await?;
    Ok(Some(compile_document(&story, &chapters)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::Story;
    use quill_narrative::InMemoryStoryStore;

    #[tokio::test]
    async fn empty_store_has_no_status() {
        let store = InMemoryStoryStore::new();
        assert!(StoryStatus::gather(&store).await.unwrap().is_none());
        assert!(compile_stored(&store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_run_reports_next_scene() {
        let store = InMemoryStoryStore::new();
        store
            .upsert_story(&Story {
                title: "Tidewater".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        let one = store.upsert_chapter(1, "Low", "").await.unwrap();
        store.upsert_scene(one, 1, Some("a"), Some("Mud.")).await.unwrap();
        store.upsert_scene(one, 2, Some("b"), None).await.unwrap();

        let status = StoryStatus::gather(&store).await.unwrap().unwrap();

        assert_eq!((status.written_scenes, status.planned_scenes), (1, 2));
        assert_eq!(status.next, Some(Location::new(1, 2)));
        assert!(!status.finished);
        assert!(status.to_string().contains("Scenes:     1/2 written"));
    }
}
