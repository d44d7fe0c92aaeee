//! In-memory implementation of [`StoryStore`].
//!
//! Keeps every table as a vector of rows in insertion order, which is the
//! same order the PostgreSQL store returns by surrogate id. Used by tests,
//! by `--in-memory` runs, and anywhere a throwaway store is enough.

use async_trait::async_trait;
use quill_core::{
    Chapter, Character, KnowledgeEntry, Location, PhraseRecord, PlotThread, ProgressionRecord,
    Relationship, Scene, SceneStructureRecord, Story, Visibility, WorldElement,
};
use quill_error::{QuillResult, StoreError, StoreErrorKind};
use quill_interface::{RowId, StoryStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct ChapterRow {
    id: RowId,
    number: u32,
    title: String,
    outline: String,
}

#[derive(Debug, Clone)]
struct SceneRow {
    id: RowId,
    chapter_id: RowId,
    number: u32,
    outline: String,
    content: Option<String>,
}

#[derive(Debug, Clone)]
struct RelationshipRow {
    id: RowId,
    a: RowId,
    b: RowId,
    description: String,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: RowId,
    story: Option<Story>,
    world: Vec<(RowId, WorldElement)>,
    chapters: Vec<ChapterRow>,
    scenes: Vec<SceneRow>,
    characters: Vec<(RowId, Character)>,
    relationships: Vec<RelationshipRow>,
    plot_threads: Vec<(RowId, PlotThread)>,
    phrases: Vec<PhraseRecord>,
    structures: Vec<SceneStructureRecord>,
    progressions: Vec<ProgressionRecord>,
    knowledge: Vec<(RowId, KnowledgeEntry)>,
}

impl Tables {
    fn allocate(&mut self) -> RowId {
        self.next_id += 1;
        self.next_id
    }

    fn character_identifier(&self, id: RowId) -> Option<&str> {
        self.characters
            .iter()
            .find(|(row_id, _)| *row_id == id)
            .map(|(_, c)| c.identifier.as_str())
    }
}

/// Volatile story store.
///
/// # Example
///
/// ```
/// use quill_interface::StoryStore;
/// use quill_narrative::InMemoryStoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = InMemoryStoryStore::new();
/// let id = store.upsert_chapter(1, "Arrival", "").await.unwrap();
/// assert_eq!(store.find_chapter_id(1).await.unwrap(), Some(id));
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStoryStore {
    tables: Arc<RwLock<Tables>>,
    reject_writes: Arc<AtomicBool>,
}

impl InMemoryStoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail with [`StoreErrorKind::Unavailable`] (for testing).
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of stored scene rows (for testing).
    pub async fn scene_count(&self) -> usize {
        self.tables.read().await.scenes.len()
    }

    /// Number of stored relationship rows (for testing).
    pub async fn relationship_count(&self) -> usize {
        self.tables.read().await.relationships.len()
    }

    #[track_caller]
    fn check_writable(&self) -> QuillResult<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::new(StoreErrorKind::Unavailable(
                "in-memory store is rejecting writes".to_string(),
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl StoryStore for InMemoryStoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn load_story(&self) -> QuillResult<Option<Story>> {
        Ok(self.tables.read().await.story.clone())
    }

    async fn upsert_story(&self, story: &Story) -> QuillResult<()> {
        self.check_writable()?;
        self.tables.write().await.story = Some(story.clone());
        Ok(())
    }

    async fn upsert_world_element(&self, element: &WorldElement) -> QuillResult<RowId> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if let Some((id, existing)) = tables.world.iter_mut().find(|(_, e)| e.name == element.name)
        {
            *existing = element.clone();
            return Ok(*id);
        }
        let id = tables.allocate();
        tables.world.push((id, element.clone()));
        Ok(id)
    }

    async fn list_world_elements(&self) -> QuillResult<Vec<WorldElement>> {
        let tables = self.tables.read().await;
        Ok(tables.world.iter().map(|(_, e)| e.clone()).collect())
    }

    async fn find_chapter_id(&self, number: u32) -> QuillResult<Option<RowId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .chapters
            .iter()
            .find(|c| c.number == number)
            .map(|c| c.id))
    }

    async fn upsert_chapter(&self, number: u32, title: &str, outline: &str) -> QuillResult<RowId> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if let Some(row) = tables.chapters.iter_mut().find(|c| c.number == number) {
            row.title = title.to_string();
            row.outline = outline.to_string();
            return Ok(row.id);
        }
        let id = tables.allocate();
        tables.chapters.push(ChapterRow {
            id,
            number,
            title: title.to_string(),
            outline: outline.to_string(),
        });
        Ok(id)
    }

    async fn upsert_scene(
        &self,
        chapter_id: RowId,
        number: u32,
        outline: Option<&str>,
        content: Option<&str>,
    ) -> QuillResult<RowId> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if !tables.chapters.iter().any(|c| c.id == chapter_id) {
            return Err(StoreError::new(StoreErrorKind::MissingParent(format!(
                "chapter id {}",
                chapter_id
            )))
            .into());
        }
        if let Some(row) = tables
            .scenes
            .iter_mut()
            .find(|s| s.chapter_id == chapter_id && s.number == number)
        {
            if let Some(outline) = outline {
                row.outline = outline.to_string();
            }
            if let Some(content) = content {
                row.content = Some(content.to_string());
            }
            return Ok(row.id);
        }
        let id = tables.allocate();
        tables.scenes.push(SceneRow {
            id,
            chapter_id,
            number,
            outline: outline.unwrap_or_default().to_string(),
            content: content.map(str::to_string),
        });
        Ok(id)
    }

    async fn list_chapters(&self) -> QuillResult<Vec<Chapter>> {
        let tables = self.tables.read().await;
        let mut chapters: Vec<Chapter> = tables
            .chapters
            .iter()
            .map(|row| {
                let mut chapter = Chapter::new(row.number, row.title.clone(), row.outline.clone());
                for scene in tables.scenes.iter().filter(|s| s.chapter_id == row.id) {
                    chapter.upsert_scene(Scene {
                        number: scene.number,
                        outline: scene.outline.clone(),
                        content: scene.content.clone(),
                    });
                }
                chapter
            })
            .collect();
        chapters.sort_by_key(|c| c.number);
        Ok(chapters)
    }

    async fn latest_written_location(&self) -> QuillResult<Option<Location>> {
        let tables = self.tables.read().await;
        Ok(tables
            .scenes
            .iter()
            .filter(|s| s.content.as_deref().is_some_and(|c| !c.is_empty()))
            .filter_map(|s| {
                let chapter = tables.chapters.iter().find(|c| c.id == s.chapter_id)?;
                Some(Location::new(chapter.number, s.number))
            })
            .max())
    }

    async fn find_character_id(&self, identifier: &str) -> QuillResult<Option<RowId>> {
        let tables = self.tables.read().await;
        Ok(tables
            .characters
            .iter()
            .find(|(_, c)| c.identifier == identifier)
            .map(|(id, _)| *id))
    }

    async fn upsert_character(&self, character: &Character) -> QuillResult<RowId> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if let Some((id, existing)) = tables
            .characters
            .iter_mut()
            .find(|(_, c)| c.identifier == character.identifier)
        {
            *existing = character.clone();
            return Ok(*id);
        }
        let id = tables.allocate();
        tables.characters.push((id, character.clone()));
        Ok(id)
    }

    async fn list_characters(&self) -> QuillResult<Vec<Character>> {
        let tables = self.tables.read().await;
        Ok(tables.characters.iter().map(|(_, c)| c.clone()).collect())
    }

    async fn upsert_relationship(
        &self,
        a: RowId,
        b: RowId,
        description: &str,
    ) -> QuillResult<RowId> {
        self.check_writable()?;
        let (a, b) = if a <= b { (a, b) } else { (b, a) };
        if a == b {
            return Err(StoreError::new(StoreErrorKind::Write(format!(
                "character {} cannot be related to itself",
                a
            )))
            .into());
        }
        let mut tables = self.tables.write().await;
        for id in [a, b] {
            if tables.character_identifier(id).is_none() {
                return Err(
                    StoreError::new(StoreErrorKind::MissingParent(format!("character id {}", id)))
                        .into(),
                );
            }
        }
        if let Some(row) = tables
            .relationships
            .iter_mut()
            .find(|r| r.a == a && r.b == b)
        {
            row.description = description.to_string();
            return Ok(row.id);
        }
        let id = tables.allocate();
        tables.relationships.push(RelationshipRow {
            id,
            a,
            b,
            description: description.to_string(),
        });
        Ok(id)
    }

    async fn list_relationships(&self) -> QuillResult<Vec<Relationship>> {
        let tables = self.tables.read().await;
        Ok(tables
            .relationships
            .iter()
            .filter_map(|r| {
                Some(Relationship::new(
                    tables.character_identifier(r.a)?,
                    tables.character_identifier(r.b)?,
                    r.description.clone(),
                ))
            })
            .collect())
    }

    async fn upsert_plot_thread(&self, thread: &PlotThread) -> QuillResult<RowId> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if let Some((id, existing)) = tables
            .plot_threads
            .iter_mut()
            .find(|(_, t)| t.name == thread.name)
        {
            *existing = thread.clone();
            return Ok(*id);
        }
        let id = tables.allocate();
        tables.plot_threads.push((id, thread.clone()));
        Ok(id)
    }

    async fn list_plot_threads(&self) -> QuillResult<Vec<PlotThread>> {
        let tables = self.tables.read().await;
        Ok(tables.plot_threads.iter().map(|(_, t)| t.clone()).collect())
    }

    async fn insert_phrase(&self, record: &PhraseRecord) -> QuillResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if tables
            .phrases
            .iter()
            .any(|p| p.phrase == record.phrase && p.phrase_type == record.phrase_type)
        {
            return Ok(false);
        }
        tables.phrases.push(record.clone());
        Ok(true)
    }

    async fn list_phrases(&self, phrase_type: Option<&str>) -> QuillResult<Vec<PhraseRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .phrases
            .iter()
            .filter(|p| phrase_type.is_none_or(|t| p.phrase_type == t))
            .cloned()
            .collect())
    }

    async fn upsert_scene_structure(&self, record: &SceneStructureRecord) -> QuillResult<()> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        match tables
            .structures
            .iter_mut()
            .find(|s| s.location == record.location)
        {
            Some(existing) => *existing = record.clone(),
            None => tables.structures.push(record.clone()),
        }
        Ok(())
    }

    async fn list_scene_structures(&self) -> QuillResult<Vec<SceneStructureRecord>> {
        let mut records = self.tables.read().await.structures.clone();
        records.sort_by_key(|r| r.location);
        Ok(records)
    }

    async fn insert_progression(&self, record: &ProgressionRecord) -> QuillResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if tables.progressions.iter().any(|p| p.key == record.key) {
            return Ok(false);
        }
        tables.progressions.push(record.clone());
        Ok(true)
    }

    async fn find_progression(&self, key: &str) -> QuillResult<Option<ProgressionRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.progressions.iter().find(|p| p.key == key).cloned())
    }

    async fn insert_knowledge(
        &self,
        character_id: RowId,
        entry: &KnowledgeEntry,
    ) -> QuillResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        if tables.character_identifier(character_id).is_none() {
            return Err(StoreError::new(StoreErrorKind::MissingParent(format!(
                "character id {}",
                character_id
            )))
            .into());
        }
        if tables
            .knowledge
            .iter()
            .any(|(id, k)| *id == character_id && k.fact == entry.fact)
        {
            return Ok(false);
        }
        tables.knowledge.push((character_id, entry.clone()));
        Ok(true)
    }

    async fn list_knowledge(&self, character_id: RowId) -> QuillResult<Vec<KnowledgeEntry>> {
        let tables = self.tables.read().await;
        Ok(tables
            .knowledge
            .iter()
            .filter(|(id, _)| *id == character_id)
            .map(|(_, k)| k.clone())
            .collect())
    }

    async fn reveal_knowledge(&self, character_id: RowId, fact: &str) -> QuillResult<bool> {
        self.check_writable()?;
        let mut tables = self.tables.write().await;
        match tables.knowledge.iter_mut().find(|(id, k)| {
            *id == character_id && k.fact == fact && k.visibility == Visibility::Secret
        }) {
            Some((_, entry)) => {
                entry.visibility = Visibility::Revealed;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(identifier: &str) -> Character {
        Character {
            identifier: identifier.to_string(),
            name: identifier.to_uppercase(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn scene_upsert_keeps_unspecified_columns() {
        let store = InMemoryStoryStore::new();
        let chapter = store.upsert_chapter(1, "One", "").await.unwrap();
        store
            .upsert_scene(chapter, 1, Some("meet"), None)
            .await
            .unwrap();
        store
            .upsert_scene(chapter, 1, None, Some("Prose."))
            .await
            .unwrap();

        let chapters = store.list_chapters().await.unwrap();
        let scene = chapters[0].scene(1).unwrap();
        assert_eq!(scene.outline, "meet");
        assert_eq!(scene.content.as_deref(), Some("Prose."));
        assert_eq!(store.scene_count().await, 1);
    }

    #[tokio::test]
    async fn scene_without_chapter_is_missing_parent() {
        let store = InMemoryStoryStore::new();
        assert!(store.upsert_scene(99, 1, Some("x"), None).await.is_err());
    }

    #[tokio::test]
    async fn latest_written_location_ignores_unwritten_scenes() {
        let store = InMemoryStoryStore::new();
        let one = store.upsert_chapter(1, "One", "").await.unwrap();
        let two = store.upsert_chapter(2, "Two", "").await.unwrap();
        store.upsert_scene(one, 1, Some("a"), Some("A")).await.unwrap();
        store.upsert_scene(one, 2, Some("b"), Some("B")).await.unwrap();
        store.upsert_scene(two, 1, Some("c"), None).await.unwrap();

        assert_eq!(
            store.latest_written_location().await.unwrap(),
            Some(Location::new(1, 2))
        );
    }

    #[tokio::test]
    async fn reveal_only_flips_secrets() {
        let store = InMemoryStoryStore::new();
        let id = store.upsert_character(&character("mara")).await.unwrap();
        let entry = KnowledgeEntry {
            character: "mara".into(),
            fact: "the key is forged".into(),
            visibility: Visibility::Public,
            source: "observed".into(),
            location: Location::first(),
        };
        assert!(store.insert_knowledge(id, &entry).await.unwrap());
        assert!(!store.insert_knowledge(id, &entry).await.unwrap());
        assert!(!store.reveal_knowledge(id, "the key is forged").await.unwrap());
    }

    #[tokio::test]
    async fn rejected_writes_leave_reads_working() {
        let store = InMemoryStoryStore::new();
        store.upsert_chapter(1, "One", "").await.unwrap();
        store.set_reject_writes(true);
        assert!(store.upsert_chapter(2, "Two", "").await.is_err());
        assert_eq!(store.list_chapters().await.unwrap().len(), 1);
    }
}
