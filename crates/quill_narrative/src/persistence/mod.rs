//! Incremental sync of working state into the store.
//!
//! After each node the engine calls [`PersistenceManager::save_node_state`],
//! which looks up the node's [`SaveStrategy`] list and writes only that
//! slice. Every write is an upsert keyed on a natural key, so saving the
//! same state twice changes nothing the second time.
//!
//! A failed write is logged and counted. It never reaches the node and
//! never stops the run.

mod cache;
mod strategy;

pub use cache::IdCache;
pub use strategy::{SaveStrategy, strategies_for};

use crate::NodeName;
use quill_core::{Chapter, PlotStatus, WorkingState};
use quill_error::{QuillResult, StoreError, StoreErrorKind};
use quill_interface::{RowId, StoryStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Store writer with an id cache.
pub struct PersistenceManager {
    store: Arc<dyn StoryStore>,
    cache: IdCache,
    thread_status: HashMap<String, PlotStatus>,
}

impl std::fmt::Debug for PersistenceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceManager")
            .field("backend", &self.store.backend_name())
            .field("cached_ids", &self.cache.len())
            .finish()
    }
}

impl PersistenceManager {
    /// Manager writing to `store`, starting with an empty cache.
    pub fn new(store: Arc<dyn StoryStore>) -> Self {
        Self {
            store,
            cache: IdCache::default(),
            thread_status: HashMap::new(),
        }
    }

    /// The id cache.
    pub fn cache(&self) -> &IdCache {
        &self.cache
    }

    /// Write the parts of `state` that `node` changed.
    ///
    /// Returns the number of entity writes that failed.
    #[tracing::instrument(skip_all, fields(node = %node))]
    pub async fn save_node_state(&mut self, node: NodeName, state: &WorkingState) -> usize {
        let mut failures = 0;
        for strategy in strategies_for(node) {
            failures += self.apply(*strategy, state).await;
        }
        if failures > 0 {
            tracing::warn!(failures, "Some writes failed, continuing with in-memory state");
        }
        failures
    }

    async fn apply(&mut self, strategy: SaveStrategy, state: &WorkingState) -> usize {
        tracing::trace!(%strategy, "Applying save strategy");
        match strategy {
            SaveStrategy::StoryConfig => {
                let result = self.store.upsert_story(&state.story).await;
                count_failure(strategy, "story", result)
            }
            SaveStrategy::PlotThreads => self.save_plot_threads(state).await,
            SaveStrategy::World => {
                let mut failures = 0;
                for element in &state.world {
                    let result = self.store.upsert_world_element(element).await;
                    failures += count_failure(strategy, &element.name, result);
                }
                failures
            }
            SaveStrategy::Characters => self.save_characters(state).await,
            SaveStrategy::Knowledge => self.save_knowledge(state).await,
            SaveStrategy::Chapters => {
                let mut failures = 0;
                for chapter in &state.chapters {
                    failures += self.save_chapter(chapter).await;
                }
                failures
            }
            SaveStrategy::ChapterPlan => match state.current_chapter() {
                Some(chapter) => self.save_chapter(chapter).await,
                None => {
                    tracing::debug!(chapter = state.cursor.chapter, "No chapter under cursor to save");
                    0
                }
            },
            SaveStrategy::SceneContent => self.save_scene_content(state).await,
        }
    }

    async fn save_plot_threads(&mut self, state: &WorkingState) -> usize {
        let mut failures = 0;
        for thread in &state.plot_threads {
            let result = self.store.upsert_plot_thread(thread).await;
            if result.is_ok() {
                let previous = self.thread_status.insert(thread.name.clone(), thread.status);
                if let Some(previous) = previous.filter(|p| *p != thread.status) {
                    tracing::debug!(
                        thread = %thread.name,
                        from = %previous,
                        to = %thread.status,
                        "Plot thread status changed"
                    );
                }
            }
            failures += count_failure(SaveStrategy::PlotThreads, &thread.name, result);
        }
        failures
    }

    async fn save_characters(&mut self, state: &WorkingState) -> usize {
        let mut failures = 0;
        for character in &state.characters {
            match self.store.upsert_character(character).await {
                Ok(id) => self.cache.remember_character(&character.identifier, id),
                Err(e) => failures += log_failure(SaveStrategy::Characters, &character.identifier, &e),
            }
        }
        for relationship in &state.relationships {
            let key = format!("{}~{}", relationship.first(), relationship.second());
            let result = self
                .save_relationship(relationship.first(), relationship.second(), &relationship.description)
                .await;
            failures += count_failure(SaveStrategy::Characters, &key, result);
        }
        failures
    }

    async fn save_relationship(&mut self, a: &str, b: &str, description: &str) -> QuillResult<RowId> {
        let a = self.require_character(a).await?;
        let b = self.require_character(b).await?;
        self.store.upsert_relationship(a, b, description).await
    }

    async fn save_knowledge(&mut self, state: &WorkingState) -> usize {
        let mut failures = 0;
        for entry in &state.knowledge_updates {
            let result = match self.require_character(&entry.character).await {
                Ok(id) => self.store.insert_knowledge(id, entry).await,
                Err(e) => Err(e),
            };
            failures += count_failure(SaveStrategy::Knowledge, &entry.character, result);
        }
        failures
    }

    async fn save_chapter(&mut self, chapter: &Chapter) -> usize {
        let id = match self
            .store
            .upsert_chapter(chapter.number, &chapter.title, &chapter.outline)
            .await
        {
            Ok(id) => {
                self.cache.remember_chapter(chapter.number, id);
                id
            }
            Err(e) => return log_failure(SaveStrategy::Chapters, &chapter.number.to_string(), &e),
        };
        let mut failures = 0;
        for scene in &chapter.scenes {
            let result = self
                .store
                .upsert_scene(id, scene.number, Some(scene.outline.as_str()), None)
                .await;
            failures += count_failure(
                SaveStrategy::ChapterPlan,
                &format!("{}.{}", chapter.number, scene.number),
                result,
            );
        }
        failures
    }

    async fn save_scene_content(&mut self, state: &WorkingState) -> usize {
        let Some(location) = state.dirty_scene else {
            return 0;
        };
        let Some(chapter) = state.chapter(location.chapter) else {
            tracing::debug!(%location, "Changed scene is not in the plan");
            return 0;
        };
        let Some(scene) = chapter.scene(location.scene) else {
            tracing::debug!(%location, "Changed scene is not in the plan");
            return 0;
        };
        let result = match self.chapter_id(chapter).await {
            Ok(id) => {
                self.store
                    .upsert_scene(
                        id,
                        scene.number,
                        Some(scene.outline.as_str()),
                        scene.content.as_deref(),
                    )
                    .await
            }
            Err(e) => Err(e),
        };
        count_failure(SaveStrategy::SceneContent, &location.to_string(), result)
    }

    /// Id of `chapter`: cache, then store, then create it.
    async fn chapter_id(&mut self, chapter: &Chapter) -> QuillResult<RowId> {
        if let Some(id) = self.cache.chapter(chapter.number) {
            return Ok(id);
        }
        let id = match self.store.find_chapter_id(chapter.number).await? {
            Some(id) => id,
            None => {
                tracing::debug!(chapter = chapter.number, "Chapter missing from store, creating it");
                self.store
                    .upsert_chapter(chapter.number, &chapter.title, &chapter.outline)
                    .await?
            }
        };
        self.cache.remember_chapter(chapter.number, id);
        Ok(id)
    }

    /// Id of a character: cache, then store.
    async fn require_character(&mut self, identifier: &str) -> QuillResult<RowId> {
        if let Some(id) = self.cache.character(identifier) {
            return Ok(id);
        }
        let id = self
            .store
            .find_character_id(identifier)
            .await?
            .ok_or_else(|| {
                StoreError::new(StoreErrorKind::MissingParent(format!(
                    "character '{}'",
                    identifier
                )))
            })?;
        self.cache.remember_character(identifier, id);
        Ok(id)
    }
}

fn count_failure<T>(strategy: SaveStrategy, entity: &str, result: QuillResult<T>) -> usize {
    match result {
        Ok(_) => 0,
        Err(e) => log_failure(strategy, entity, &e),
    }
}

fn log_failure(strategy: SaveStrategy, entity: &str, error: &quill_error::QuillError) -> usize {
    tracing::warn!(%strategy, entity, error = %error, "Store write failed");
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStoryStore;
    use quill_core::{Character, Location, Relationship, Scene};

    fn state_with_scene() -> WorkingState {
        let mut state = WorkingState::default();
        let mut chapter = Chapter::new(1, "One", "opening");
        chapter.upsert_scene(Scene {
            number: 1,
            outline: "arrival".into(),
            content: Some("The train was late.".into()),
        });
        state.chapters.push(chapter);
        state.dirty_scene = Some(Location::new(1, 1));
        state
    }

    #[tokio::test]
    async fn scene_content_creates_missing_chapter() {
        let store = InMemoryStoryStore::new();
        let mut manager = PersistenceManager::new(Arc::new(store.clone()));

        let failures = manager
            .save_node_state(NodeName::WriteScene, &state_with_scene())
            .await;

        assert_eq!(failures, 0);
        let chapters = store.list_chapters().await.unwrap();
        assert_eq!(
            chapters[0].scene(1).unwrap().content.as_deref(),
            Some("The train was late.")
        );
    }

    #[tokio::test]
    async fn cold_cache_falls_back_to_store() {
        let store = InMemoryStoryStore::new();
        let existing = store.upsert_chapter(1, "One", "opening").await.unwrap();
        let mut manager = PersistenceManager::new(Arc::new(store.clone()));
        assert!(manager.cache().is_empty());

        manager
            .save_node_state(NodeName::WriteScene, &state_with_scene())
            .await;

        assert_eq!(manager.cache().chapter(1), Some(existing));
        assert_eq!(store.list_chapters().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn relationship_to_unsaved_character_is_counted() {
        let store = InMemoryStoryStore::new();
        let mut manager = PersistenceManager::new(Arc::new(store));
        let mut state = WorkingState::default();
        state.characters.push(Character {
            identifier: "mara".into(),
            ..Default::default()
        });
        state
            .relationships
            .push(Relationship::new("mara", "ghost", "haunted by"));

        let failures = manager
            .save_node_state(NodeName::CreateCharacters, &state)
            .await;
        assert_eq!(failures, 1);
    }
}
