//! Relational store trait.

use async_trait::async_trait;
use quill_core::{
    Chapter, Character, KnowledgeEntry, Location, PhraseRecord, PlotThread, ProgressionRecord,
    Relationship, SceneStructureRecord, Story, WorldElement,
};
use quill_error::QuillResult;

/// Store-assigned surrogate identifier.
pub type RowId = i64;

/// Durable entity store for a single story.
///
/// Every write is keyed by a natural key and is idempotent: writing the same
/// value twice leaves one row. Ledger inserts report whether a new row was
/// created rather than failing on duplicates. No method spans more than one
/// row-level write, so callers get no cross-entity atomicity.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Short backend name for logging.
    fn backend_name(&self) -> &'static str;

    // ---- story -------------------------------------------------------

    /// The singleton story row, if one exists.
    async fn load_story(&self) -> QuillResult<Option<Story>>;

    /// Create or overwrite the singleton story row.
    async fn upsert_story(&self, story: &Story) -> QuillResult<()>;

    // ---- world -------------------------------------------------------

    /// Create or update a world element by name.
    async fn upsert_world_element(&self, element: &WorldElement) -> QuillResult<RowId>;

    /// All world elements, in insertion order.
    async fn list_world_elements(&self) -> QuillResult<Vec<WorldElement>>;

    // ---- chapters and scenes ----------------------------------------

    /// Surrogate id of a chapter by number.
    async fn find_chapter_id(&self, number: u32) -> QuillResult<Option<RowId>>;

    /// Create or update a chapter by number.
    async fn upsert_chapter(&self, number: u32, title: &str, outline: &str) -> QuillResult<RowId>;

    /// Create or update a scene keyed by `(chapter_id, number)`.
    ///
    /// `None` for `outline` or `content` leaves the stored value untouched.
    async fn upsert_scene(
        &self,
        chapter_id: RowId,
        number: u32,
        outline: Option<&str>,
        content: Option<&str>,
    ) -> QuillResult<RowId>;

    /// All chapters ascending, each with its scenes ascending.
    async fn list_chapters(&self) -> QuillResult<Vec<Chapter>>;

    /// Highest location whose scene has content.
    async fn latest_written_location(&self) -> QuillResult<Option<Location>>;

    // ---- characters --------------------------------------------------

    /// Surrogate id of a character by identifier.
    async fn find_character_id(&self, identifier: &str) -> QuillResult<Option<RowId>>;

    /// Create or update a character by identifier, preserving its id.
    async fn upsert_character(&self, character: &Character) -> QuillResult<RowId>;

    /// All characters, in insertion order.
    async fn list_characters(&self) -> QuillResult<Vec<Character>>;

    /// Create or update the undirected relationship between two characters.
    ///
    /// `(a, b)` and `(b, a)` address the same row.
    async fn upsert_relationship(
        &self,
        a: RowId,
        b: RowId,
        description: &str,
    ) -> QuillResult<RowId>;

    /// All relationships, with character identifiers resolved.
    async fn list_relationships(&self) -> QuillResult<Vec<Relationship>>;

    // ---- plot threads ------------------------------------------------

    /// Create or update a plot thread by name.
    async fn upsert_plot_thread(&self, thread: &PlotThread) -> QuillResult<RowId>;

    /// All plot threads, in insertion order.
    async fn list_plot_threads(&self) -> QuillResult<Vec<PlotThread>>;

    // ---- ledgers -----------------------------------------------------

    /// Record a used phrase. Returns `false` if `(phrase, type)` already exists.
    async fn insert_phrase(&self, record: &PhraseRecord) -> QuillResult<bool>;

    /// Used phrases, optionally restricted to one type.
    async fn list_phrases(&self, phrase_type: Option<&str>) -> QuillResult<Vec<PhraseRecord>>;

    /// Create or overwrite the structure fingerprint for a scene.
    async fn upsert_scene_structure(&self, record: &SceneStructureRecord) -> QuillResult<()>;

    /// All structure fingerprints, ascending by location.
    async fn list_scene_structures(&self) -> QuillResult<Vec<SceneStructureRecord>>;

    /// Record a progression. Returns `false` and leaves the original row
    /// untouched if the key already exists.
    async fn insert_progression(&self, record: &ProgressionRecord) -> QuillResult<bool>;

    /// Progression by key.
    async fn find_progression(&self, key: &str) -> QuillResult<Option<ProgressionRecord>>;

    /// Append a knowledge entry. Returns `false` if the character already
    /// holds the fact.
    async fn insert_knowledge(&self, character_id: RowId, entry: &KnowledgeEntry)
    -> QuillResult<bool>;

    /// Knowledge held by one character, in insertion order.
    async fn list_knowledge(&self, character_id: RowId) -> QuillResult<Vec<KnowledgeEntry>>;

    /// Flip a fact from `secret` to `revealed`.
    ///
    /// Returns `false` if the fact is absent or not currently secret.
    async fn reveal_knowledge(&self, character_id: RowId, fact: &str) -> QuillResult<bool>;
}
