//! PostgreSQL implementation of StoryStore.

use crate::DatabaseResult;
use crate::connection::{PgPool, create_pool, database_url, run_migrations};
use crate::conversions::{
    STORY_ROW_ID, chapter_to_row, character_to_row, knowledge_to_row, normalize_pair,
    number as sql_number, phrase_to_row, plot_thread_to_row, progression_to_row, row_to_character,
    row_to_knowledge, row_to_phrase, row_to_plot_thread, row_to_progression, row_to_story,
    row_to_structure, row_to_world_element, rows_to_chapters, story_to_row, structure_to_row,
    world_element_to_row,
};
use crate::models::{
    ChapterRow, CharacterRow, KnowledgeRow, NewRelationshipRow, NewSceneRow, PhraseRow,
    PlotThreadRow, ProgressionRow, RelationshipRow, SceneChanges, SceneRow, SceneStructureRow,
    StoryRow, WorldElementRow,
};
use crate::schema::{
    chapters, character_knowledge, character_relationships, characters, plot_progressions,
    plot_threads, scene_structures, scenes, stories, used_phrases, world_elements,
};

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use quill_core::{
    Chapter, Character, KnowledgeEntry, Location, PhraseRecord, PlotThread, ProgressionRecord,
    Relationship, SceneStructureRecord, Story, Visibility, WorldElement,
};
use quill_error::{DatabaseError, DatabaseErrorKind, QuillResult, StoreError, StoreErrorKind};
use quill_interface::{RowId, StoryStore};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// PostgreSQL story store using Diesel with r2d2 connection pooling.
///
/// Blocking Diesel calls run on Tokio's blocking thread pool.
///
/// # Example
///
/// ```no_run
/// use quill_database::PostgresStoryStore;
///
/// // Requires DATABASE_URL=postgresql://localhost/quill in environment
/// let store = PostgresStoryStore::from_env().expect("database reachable");
/// ```
#[derive(Debug, Clone)]
pub struct PostgresStoryStore {
    pool: PgPool,
}

impl PostgresStoryStore {
    /// Wrap an existing pool. Migrations are not run.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url`, apply pending migrations and return the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or a migration fails.
    pub fn connect(url: &str) -> DatabaseResult<Self> {
        let pool = create_pool(url, 4)?;
        let mut conn = pool.get().map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection(format!(
                "Failed to warm up connection pool: {}",
                e
            )))
        })?;
        run_migrations(&mut conn)?;
        Ok(Self { pool })
    }

    /// Connect using `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or the connection fails.
    pub fn from_env() -> DatabaseResult<Self> {
        Self::connect(&database_url()?)
    }

    async fn with_conn<T, F>(&self, op: &'static str, f: F) -> QuillResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Connection(format!(
                    "Failed to get connection from pool: {}",
                    e
                )))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            StoreError::new(StoreErrorKind::Unavailable(format!(
                "{} task failed: {}",
                op, e
            )))
        })?;

        outcome.map_err(|e| {
            debug!(op, error = %e, "Store operation failed");
            e.into()
        })
    }
}

#[async_trait]
impl StoryStore for PostgresStoryStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self))]
    async fn load_story(&self) -> QuillResult<Option<Story>> {
        self.with_conn("load_story", |conn| {
            let row = stories::table
                .find(STORY_ROW_ID)
                .select(StoryRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(row_to_story))
        })
        .await
    }

    #[instrument(skip(self, story), fields(title = %story.title))]
    async fn upsert_story(&self, story: &Story) -> QuillResult<()> {
        let row = story_to_row(story);
        self.with_conn("upsert_story", move |conn| {
            diesel::insert_into(stories::table)
                .values(&row)
                .on_conflict(stories::id)
                .do_update()
                .set((&row, stories::updated_at.eq(diesel::dsl::now)))
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, element), fields(name = %element.name))]
    async fn upsert_world_element(&self, element: &WorldElement) -> QuillResult<RowId> {
        let row = world_element_to_row(element);
        self.with_conn("upsert_world_element", move |conn| {
            let id = diesel::insert_into(world_elements::table)
                .values(&row)
                .on_conflict(world_elements::name)
                .do_update()
                .set(&row)
                .returning(world_elements::id)
                .get_result::<i64>(conn)?;
            Ok(id)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_world_elements(&self) -> QuillResult<Vec<WorldElement>> {
        self.with_conn("list_world_elements", |conn| {
            let rows = world_elements::table
                .order(world_elements::id.asc())
                .select(WorldElementRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(row_to_world_element).collect())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_chapter_id(&self, number: u32) -> QuillResult<Option<RowId>> {
        let number = sql_number(number)?;
        self.with_conn("find_chapter_id", move |conn| {
            let id = chapters::table
                .filter(chapters::chapter_number.eq(number))
                .select(chapters::id)
                .first::<i64>(conn)
                .optional()?;
            Ok(id)
        })
        .await
    }

    #[instrument(skip(self, title, outline))]
    async fn upsert_chapter(&self, number: u32, title: &str, outline: &str) -> QuillResult<RowId> {
        let row = chapter_to_row(number, title, outline)?;
        self.with_conn("upsert_chapter", move |conn| {
            let id = diesel::insert_into(chapters::table)
                .values(&row)
                .on_conflict(chapters::chapter_number)
                .do_update()
                .set(&row)
                .returning(chapters::id)
                .get_result::<i64>(conn)?;
            Ok(id)
        })
        .await
    }

    #[instrument(skip(self, outline, content), fields(has_content = content.is_some()))]
    async fn upsert_scene(
        &self,
        chapter_id: RowId,
        number: u32,
        outline: Option<&str>,
        content: Option<&str>,
    ) -> QuillResult<RowId> {
        let number = sql_number(number)?;
        let changes = SceneChanges {
            outline: outline.map(str::to_string),
            content: content.map(str::to_string),
        };
        self.with_conn("upsert_scene", move |conn| {
            let existing = scenes::table
                .filter(scenes::chapter_id.eq(chapter_id))
                .filter(scenes::scene_number.eq(number))
                .select(scenes::id)
                .first::<i64>(conn)
                .optional()?;

            match existing {
                Some(id) => {
                    if !changes.is_empty() {
                        diesel::update(scenes::table.find(id))
                            .set((&changes, scenes::updated_at.eq(diesel::dsl::now)))
                            .execute(conn)?;
                    }
                    Ok(id)
                }
                None => {
                    let row = NewSceneRow {
                        chapter_id,
                        scene_number: number,
                        outline: changes.outline.unwrap_or_default(),
                        content: changes.content,
                    };
                    let id = diesel::insert_into(scenes::table)
                        .values(&row)
                        .returning(scenes::id)
                        .get_result::<i64>(conn)?;
                    Ok(id)
                }
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_chapters(&self) -> QuillResult<Vec<Chapter>> {
        self.with_conn("list_chapters", |conn| {
            let chapter_rows = chapters::table
                .order(chapters::chapter_number.asc())
                .select(ChapterRow::as_select())
                .load(conn)?;
            let scene_rows = scenes::table
                .order((scenes::chapter_id.asc(), scenes::scene_number.asc()))
                .select(SceneRow::as_select())
                .load(conn)?;
            rows_to_chapters(chapter_rows, scene_rows)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn latest_written_location(&self) -> QuillResult<Option<Location>> {
        self.with_conn("latest_written_location", |conn| {
            let latest = scenes::table
                .inner_join(chapters::table)
                .filter(scenes::content.is_not_null())
                .filter(scenes::content.ne(""))
                .order((chapters::chapter_number.desc(), scenes::scene_number.desc()))
                .select((chapters::chapter_number, scenes::scene_number))
                .first::<(i32, i32)>(conn)
                .optional()?;
            Ok(latest.and_then(|(chapter, scene)| {
                Some(Location::new(
                    u32::try_from(chapter).ok()?,
                    u32::try_from(scene).ok()?,
                ))
            }))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_character_id(&self, identifier: &str) -> QuillResult<Option<RowId>> {
        let identifier = identifier.to_string();
        self.with_conn("find_character_id", move |conn| {
            let id = characters::table
                .filter(characters::identifier.eq(&identifier))
                .select(characters::id)
                .first::<i64>(conn)
                .optional()?;
            Ok(id)
        })
        .await
    }

    #[instrument(skip(self, character), fields(identifier = %character.identifier))]
    async fn upsert_character(&self, character: &Character) -> QuillResult<RowId> {
        let row = character_to_row(character);
        self.with_conn("upsert_character", move |conn| {
            let id = diesel::insert_into(characters::table)
                .values(&row)
                .on_conflict(characters::identifier)
                .do_update()
                .set(&row)
                .returning(characters::id)
                .get_result::<i64>(conn)?;
            Ok(id)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_characters(&self) -> QuillResult<Vec<Character>> {
        self.with_conn("list_characters", |conn| {
            let rows = characters::table
                .order(characters::id.asc())
                .select(CharacterRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(row_to_character).collect())
        })
        .await
    }

    #[instrument(skip(self, description))]
    async fn upsert_relationship(
        &self,
        a: RowId,
        b: RowId,
        description: &str,
    ) -> QuillResult<RowId> {
        let (first, second) = normalize_pair(a, b);
        if first == second {
            return Err(StoreError::new(StoreErrorKind::Write(format!(
                "character {} cannot be related to itself",
                a
            )))
            .into());
        }
        let row = NewRelationshipRow {
            character_a: first,
            character_b: second,
            description: description.to_string(),
        };
        self.with_conn("upsert_relationship", move |conn| {
            let id = diesel::insert_into(character_relationships::table)
                .values(&row)
                .on_conflict((
                    character_relationships::character_a,
                    character_relationships::character_b,
                ))
                .do_update()
                .set(character_relationships::description.eq(&row.description))
                .returning(character_relationships::id)
                .get_result::<i64>(conn)?;
            Ok(id)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_relationships(&self) -> QuillResult<Vec<Relationship>> {
        self.with_conn("list_relationships", |conn| {
            let identifiers: HashMap<i64, String> = characters::table
                .select((characters::id, characters::identifier))
                .load::<(i64, String)>(conn)?
                .into_iter()
                .collect();
            let rows = character_relationships::table
                .order(character_relationships::id.asc())
                .select(RelationshipRow::as_select())
                .load(conn)?;

            rows.into_iter()
                .map(|row| {
                    let lookup = |id: i64| {
                        identifiers.get(&id).cloned().ok_or_else(|| {
                            DatabaseError::new(DatabaseErrorKind::Query(format!(
                                "relationship {} references missing character {}",
                                row.id, id
                            )))
                        })
                    };
                    Ok(Relationship::new(
                        lookup(row.character_a)?,
                        lookup(row.character_b)?,
                        row.description.clone(),
                    ))
                })
                .collect()
        })
        .await
    }

    #[instrument(skip(self, thread), fields(name = %thread.name, status = %thread.status))]
    async fn upsert_plot_thread(&self, thread: &PlotThread) -> QuillResult<RowId> {
        let row = plot_thread_to_row(thread);
        self.with_conn("upsert_plot_thread", move |conn| {
            let id = diesel::insert_into(plot_threads::table)
                .values(&row)
                .on_conflict(plot_threads::name)
                .do_update()
                .set(&row)
                .returning(plot_threads::id)
                .get_result::<i64>(conn)?;
            Ok(id)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_plot_threads(&self) -> QuillResult<Vec<PlotThread>> {
        self.with_conn("list_plot_threads", |conn| {
            let rows = plot_threads::table
                .order(plot_threads::id.asc())
                .select(PlotThreadRow::as_select())
                .load(conn)?;
            rows.into_iter().map(row_to_plot_thread).collect()
        })
        .await
    }

    #[instrument(skip(self, record), fields(phrase_type = %record.phrase_type))]
    async fn insert_phrase(&self, record: &PhraseRecord) -> QuillResult<bool> {
        let row = phrase_to_row(record)?;
        self.with_conn("insert_phrase", move |conn| {
            let inserted = diesel::insert_into(used_phrases::table)
                .values(&row)
                .on_conflict((used_phrases::phrase, used_phrases::phrase_type))
                .do_nothing()
                .execute(conn)?;
            Ok(inserted == 1)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_phrases(&self, phrase_type: Option<&str>) -> QuillResult<Vec<PhraseRecord>> {
        let phrase_type = phrase_type.map(str::to_string);
        self.with_conn("list_phrases", move |conn| {
            let mut query = used_phrases::table
                .order(used_phrases::id.asc())
                .select(PhraseRow::as_select())
                .into_boxed();
            if let Some(phrase_type) = phrase_type {
                query = query.filter(used_phrases::phrase_type.eq(phrase_type));
            }
            query.load(conn)?.into_iter().map(row_to_phrase).collect()
        })
        .await
    }

    #[instrument(skip(self, record), fields(location = %record.location))]
    async fn upsert_scene_structure(&self, record: &SceneStructureRecord) -> QuillResult<()> {
        let row = structure_to_row(record)?;
        self.with_conn("upsert_scene_structure", move |conn| {
            diesel::insert_into(scene_structures::table)
                .values(&row)
                .on_conflict((scene_structures::chapter_number, scene_structures::scene_number))
                .do_update()
                .set(&row)
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_scene_structures(&self) -> QuillResult<Vec<SceneStructureRecord>> {
        self.with_conn("list_scene_structures", |conn| {
            let rows = scene_structures::table
                .order((
                    scene_structures::chapter_number.asc(),
                    scene_structures::scene_number.asc(),
                ))
                .select(SceneStructureRow::as_select())
                .load(conn)?;
            rows.into_iter().map(row_to_structure).collect()
        })
        .await
    }

    #[instrument(skip(self, record), fields(key = %record.key))]
    async fn insert_progression(&self, record: &ProgressionRecord) -> QuillResult<bool> {
        let row = progression_to_row(record)?;
        self.with_conn("insert_progression", move |conn| {
            let inserted = diesel::insert_into(plot_progressions::table)
                .values(&row)
                .on_conflict(plot_progressions::progression_key)
                .do_nothing()
                .execute(conn)?;
            Ok(inserted == 1)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_progression(&self, key: &str) -> QuillResult<Option<ProgressionRecord>> {
        let key = key.to_string();
        self.with_conn("find_progression", move |conn| {
            let row = plot_progressions::table
                .filter(plot_progressions::progression_key.eq(&key))
                .select(ProgressionRow::as_select())
                .first(conn)
                .optional()?;
            row.map(row_to_progression).transpose()
        })
        .await
    }

    #[instrument(skip(self, entry), fields(visibility = %entry.visibility))]
    async fn insert_knowledge(
        &self,
        character_id: RowId,
        entry: &KnowledgeEntry,
    ) -> QuillResult<bool> {
        let row = knowledge_to_row(character_id, entry)?;
        self.with_conn("insert_knowledge", move |conn| {
            let inserted = diesel::insert_into(character_knowledge::table)
                .values(&row)
                .on_conflict((
                    character_knowledge::character_id,
                    character_knowledge::knowledge_content,
                ))
                .do_nothing()
                .execute(conn)?;
            Ok(inserted == 1)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_knowledge(&self, character_id: RowId) -> QuillResult<Vec<KnowledgeEntry>> {
        self.with_conn("list_knowledge", move |conn| {
            let Some(identifier) = characters::table
                .find(character_id)
                .select(characters::identifier)
                .first::<String>(conn)
                .optional()?
            else {
                return Ok(Vec::new());
            };
            let rows = character_knowledge::table
                .filter(character_knowledge::character_id.eq(character_id))
                .order(character_knowledge::id.asc())
                .select(KnowledgeRow::as_select())
                .load(conn)?;
            rows.into_iter()
                .map(|row| row_to_knowledge(row, &identifier))
                .collect()
        })
        .await
    }

    #[instrument(skip(self, fact))]
    async fn reveal_knowledge(&self, character_id: RowId, fact: &str) -> QuillResult<bool> {
        let fact = fact.to_string();
        self.with_conn("reveal_knowledge", move |conn| {
            let updated = diesel::update(
                character_knowledge::table
                    .filter(character_knowledge::character_id.eq(character_id))
                    .filter(character_knowledge::knowledge_content.eq(&fact))
                    .filter(character_knowledge::visibility.eq(Visibility::Secret.as_str())),
            )
            .set(character_knowledge::visibility.eq(Visibility::Revealed.as_str()))
            .execute(conn)?;
            Ok(updated == 1)
        })
        .await
    }
}
