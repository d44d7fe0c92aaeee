//! Row models for the story tables.

use crate::schema::{
    chapters, character_knowledge, character_relationships, characters, plot_progressions,
    plot_threads, scene_structures, scenes, stories, used_phrases, world_elements,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Singleton story row.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = stories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoryRow {
    pub id: i32,
    pub title: String,
    pub genre: String,
    pub tone: String,
    pub author_style: String,
    pub language: String,
    pub premise: String,
    pub outline: Option<String>,
    pub updated_at: NaiveDateTime,
}

/// Story row for insert or overwrite.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = stories)]
#[diesel(treat_none_as_null = true)]
pub struct NewStoryRow {
    pub id: i32,
    pub title: String,
    pub genre: String,
    pub tone: String,
    pub author_style: String,
    pub language: String,
    pub premise: String,
    pub outline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = world_elements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorldElementRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = world_elements)]
pub struct NewWorldElementRow {
    pub name: String,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = chapters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChapterRow {
    pub id: i64,
    pub chapter_number: i32,
    pub title: String,
    pub outline: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = chapters)]
pub struct NewChapterRow {
    pub chapter_number: i32,
    pub title: String,
    pub outline: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = scenes)]
#[diesel(belongs_to(ChapterRow, foreign_key = chapter_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SceneRow {
    pub id: i64,
    pub chapter_id: i64,
    pub scene_number: i32,
    pub outline: String,
    pub content: Option<String>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = scenes)]
pub struct NewSceneRow {
    pub chapter_id: i64,
    pub scene_number: i32,
    pub outline: String,
    pub content: Option<String>,
}

/// Partial scene update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = scenes)]
pub struct SceneChanges {
    pub outline: Option<String>,
    pub content: Option<String>,
}

impl SceneChanges {
    pub fn is_empty(&self) -> bool {
        self.outline.is_none() && self.content.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = characters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CharacterRow {
    pub id: i64,
    pub identifier: String,
    pub name: String,
    pub role: String,
    pub profile: String,
    pub motivation: String,
    pub arc: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = characters)]
pub struct NewCharacterRow {
    pub identifier: String,
    pub name: String,
    pub role: String,
    pub profile: String,
    pub motivation: String,
    pub arc: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = character_relationships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RelationshipRow {
    pub id: i64,
    pub character_a: i64,
    pub character_b: i64,
    pub description: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = character_relationships)]
pub struct NewRelationshipRow {
    pub character_a: i64,
    pub character_b: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = plot_threads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlotThreadRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: String,
    pub importance: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = plot_threads)]
pub struct NewPlotThreadRow {
    pub name: String,
    pub description: String,
    pub status: String,
    pub importance: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = character_knowledge)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct KnowledgeRow {
    pub id: i64,
    pub character_id: i64,
    pub knowledge_content: String,
    pub visibility: String,
    pub source: String,
    pub chapter_number: i32,
    pub scene_number: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = character_knowledge)]
pub struct NewKnowledgeRow {
    pub character_id: i64,
    pub knowledge_content: String,
    pub visibility: String,
    pub source: String,
    pub chapter_number: i32,
    pub scene_number: i32,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = plot_progressions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProgressionRow {
    pub id: i64,
    pub progression_key: String,
    pub chapter_number: i32,
    pub scene_number: i32,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plot_progressions)]
pub struct NewProgressionRow {
    pub progression_key: String,
    pub chapter_number: i32,
    pub scene_number: i32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = used_phrases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PhraseRow {
    pub id: i64,
    pub phrase: String,
    pub phrase_type: String,
    pub chapter_number: i32,
    pub scene_number: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = used_phrases)]
pub struct NewPhraseRow {
    pub phrase: String,
    pub phrase_type: String,
    pub chapter_number: i32,
    pub scene_number: i32,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = scene_structures)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SceneStructureRow {
    pub id: i64,
    pub chapter_number: i32,
    pub scene_number: i32,
    pub scene_type: String,
    pub opening: String,
    pub climax: String,
    pub resolution: String,
    pub pattern: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = scene_structures)]
pub struct NewSceneStructureRow {
    pub chapter_number: i32,
    pub scene_number: i32,
    pub scene_type: String,
    pub opening: String,
    pub climax: String,
    pub resolution: String,
    pub pattern: String,
}
