//! Conversions between row models and domain types.

use crate::DatabaseResult;
use crate::models::{
    ChapterRow, CharacterRow, KnowledgeRow, NewChapterRow, NewCharacterRow, NewKnowledgeRow,
    NewPhraseRow, NewPlotThreadRow, NewProgressionRow, NewSceneStructureRow, NewStoryRow,
    NewWorldElementRow, PhraseRow, PlotThreadRow, ProgressionRow, SceneRow, SceneStructureRow,
    StoryRow, WorldElementRow,
};
use quill_core::{
    Chapter, Character, KnowledgeEntry, Location, PhraseRecord, PlotThread, ProgressionRecord,
    Scene, SceneStructureRecord, Story, WorldElement,
};
use quill_error::{DatabaseError, DatabaseErrorKind};
use std::collections::HashMap;

/// Primary key of the singleton story row.
pub const STORY_ROW_ID: i32 = 1;

/// Fit a 1-based number into an `INTEGER` column.
pub fn number(value: u32) -> DatabaseResult<i32> {
    i32::try_from(value).map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Conversion(format!(
            "{} does not fit an INTEGER column",
            value
        )))
    })
}

fn unsigned(column: &str, value: i32) -> DatabaseResult<u32> {
    u32::try_from(value).map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Serialization(format!(
            "negative value {} in column {}",
            value, column
        )))
    })
}

fn location(chapter: i32, scene: i32) -> DatabaseResult<Location> {
    Ok(Location::new(
        unsigned("chapter_number", chapter)?,
        unsigned("scene_number", scene)?,
    ))
}

fn parse<T: std::str::FromStr<Err = String>>(column: &str, value: &str) -> DatabaseResult<T> {
    value.parse::<T>().map_err(|e| {
        DatabaseError::new(DatabaseErrorKind::Serialization(format!(
            "{} in column {}",
            e, column
        )))
    })
}

pub fn story_to_row(story: &Story) -> NewStoryRow {
    NewStoryRow {
        id: STORY_ROW_ID,
        title: story.title.clone(),
        genre: story.genre.clone(),
        tone: story.tone.clone(),
        author_style: story.author_style.clone(),
        language: story.language.clone(),
        premise: story.premise.clone(),
        outline: story.outline.clone(),
    }
}

pub fn row_to_story(row: StoryRow) -> Story {
    Story {
        title: row.title,
        genre: row.genre,
        tone: row.tone,
        author_style: row.author_style,
        language: row.language,
        premise: row.premise,
        outline: row.outline,
    }
}

pub fn world_element_to_row(element: &WorldElement) -> NewWorldElementRow {
    NewWorldElementRow {
        name: element.name.clone(),
        category: element.category.clone(),
        description: element.description.clone(),
    }
}

pub fn row_to_world_element(row: WorldElementRow) -> WorldElement {
    WorldElement {
        name: row.name,
        category: row.category,
        description: row.description,
    }
}

pub fn chapter_to_row(
    chapter_number: u32,
    title: &str,
    outline: &str,
) -> DatabaseResult<NewChapterRow> {
    Ok(NewChapterRow {
        chapter_number: number(chapter_number)?,
        title: title.to_string(),
        outline: outline.to_string(),
    })
}

/// Assemble chapters with their scenes, both ascending.
pub fn rows_to_chapters(
    chapter_rows: Vec<ChapterRow>,
    scene_rows: Vec<SceneRow>,
) -> DatabaseResult<Vec<Chapter>> {
    let mut scenes_by_chapter: HashMap<i64, Vec<Scene>> = HashMap::new();
    for row in scene_rows {
        scenes_by_chapter.entry(row.chapter_id).or_default().push(Scene {
            number: unsigned("scene_number", row.scene_number)?,
            outline: row.outline,
            content: row.content,
        });
    }

    let mut chapters = Vec::with_capacity(chapter_rows.len());
    for row in chapter_rows {
        let mut scenes = scenes_by_chapter.remove(&row.id).unwrap_or_default();
        scenes.sort_by_key(|s| s.number);
        chapters.push(Chapter {
            number: unsigned("chapter_number", row.chapter_number)?,
            title: row.title,
            outline: row.outline,
            scenes,
        });
    }
    chapters.sort_by_key(|c| c.number);
    Ok(chapters)
}

pub fn character_to_row(character: &Character) -> NewCharacterRow {
    NewCharacterRow {
        identifier: character.identifier.clone(),
        name: character.name.clone(),
        role: character.role.clone(),
        profile: character.profile.clone(),
        motivation: character.motivation.clone(),
        arc: character.arc.clone(),
    }
}

pub fn row_to_character(row: CharacterRow) -> Character {
    Character {
        identifier: row.identifier,
        name: row.name,
        role: row.role,
        profile: row.profile,
        motivation: row.motivation,
        arc: row.arc,
    }
}

pub fn plot_thread_to_row(thread: &PlotThread) -> NewPlotThreadRow {
    NewPlotThreadRow {
        name: thread.name.clone(),
        description: thread.description.clone(),
        status: thread.status.as_str().to_string(),
        importance: thread.importance.as_str().to_string(),
    }
}

pub fn row_to_plot_thread(row: PlotThreadRow) -> DatabaseResult<PlotThread> {
    Ok(PlotThread {
        status: parse("status", &row.status)?,
        importance: parse("importance", &row.importance)?,
        name: row.name,
        description: row.description,
    })
}

pub fn knowledge_to_row(
    character_id: i64,
    entry: &KnowledgeEntry,
) -> DatabaseResult<NewKnowledgeRow> {
    Ok(NewKnowledgeRow {
        character_id,
        knowledge_content: entry.fact.clone(),
        visibility: entry.visibility.as_str().to_string(),
        source: entry.source.clone(),
        chapter_number: number(entry.location.chapter)?,
        scene_number: number(entry.location.scene)?,
    })
}

pub fn row_to_knowledge(row: KnowledgeRow, character: &str) -> DatabaseResult<KnowledgeEntry> {
    Ok(KnowledgeEntry {
        character: character.to_string(),
        visibility: parse("visibility", &row.visibility)?,
        location: location(row.chapter_number, row.scene_number)?,
        fact: row.knowledge_content,
        source: row.source,
    })
}

pub fn progression_to_row(record: &ProgressionRecord) -> DatabaseResult<NewProgressionRow> {
    Ok(NewProgressionRow {
        progression_key: record.key.clone(),
        chapter_number: number(record.location.chapter)?,
        scene_number: number(record.location.scene)?,
        description: record.description.clone(),
    })
}

pub fn row_to_progression(row: ProgressionRow) -> DatabaseResult<ProgressionRecord> {
    Ok(ProgressionRecord {
        location: location(row.chapter_number, row.scene_number)?,
        key: row.progression_key,
        description: row.description,
    })
}

pub fn phrase_to_row(record: &PhraseRecord) -> DatabaseResult<NewPhraseRow> {
    Ok(NewPhraseRow {
        phrase: record.phrase.clone(),
        phrase_type: record.phrase_type.clone(),
        chapter_number: number(record.location.chapter)?,
        scene_number: number(record.location.scene)?,
    })
}

pub fn row_to_phrase(row: PhraseRow) -> DatabaseResult<PhraseRecord> {
    Ok(PhraseRecord {
        location: location(row.chapter_number, row.scene_number)?,
        phrase: row.phrase,
        phrase_type: row.phrase_type,
    })
}

pub fn structure_to_row(record: &SceneStructureRecord) -> DatabaseResult<NewSceneStructureRow> {
    Ok(NewSceneStructureRow {
        chapter_number: number(record.location.chapter)?,
        scene_number: number(record.location.scene)?,
        scene_type: record.scene_type.clone(),
        opening: record.opening.clone(),
        climax: record.climax.clone(),
        resolution: record.resolution.clone(),
        pattern: record.pattern.clone(),
    })
}

pub fn row_to_structure(row: SceneStructureRow) -> DatabaseResult<SceneStructureRecord> {
    Ok(SceneStructureRecord {
        location: location(row.chapter_number, row.scene_number)?,
        scene_type: row.scene_type,
        opening: row.opening,
        climax: row.climax,
        resolution: row.resolution,
        pattern: row.pattern,
    })
}

/// Order a character id pair the way the relationships table stores it.
pub fn normalize_pair(a: i64, b: i64) -> (i64, i64) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_normalization_is_symmetric() {
        assert_eq!(normalize_pair(9, 2), normalize_pair(2, 9));
        assert_eq!(normalize_pair(2, 9), (2, 9));
    }

    #[test]
    fn corrupt_status_is_rejected() {
        let row = PlotThreadRow {
            id: 1,
            name: "heist".into(),
            description: String::new(),
            status: "exploded".into(),
            importance: "major".into(),
        };
        assert!(row_to_plot_thread(row).is_err());
    }

    #[test]
    fn scenes_group_under_their_chapter() {
        let now = chrono::NaiveDateTime::default();
        let chapters = vec![
            ChapterRow {
                id: 20,
                chapter_number: 2,
                title: "Two".into(),
                outline: String::new(),
                created_at: now,
            },
            ChapterRow {
                id: 10,
                chapter_number: 1,
                title: "One".into(),
                outline: String::new(),
                created_at: now,
            },
        ];
        let scenes = vec![
            SceneRow {
                id: 3,
                chapter_id: 10,
                scene_number: 2,
                outline: String::new(),
                content: None,
                updated_at: now,
            },
            SceneRow {
                id: 4,
                chapter_id: 10,
                scene_number: 1,
                outline: String::new(),
                content: Some("Prose".into()),
                updated_at: now,
            },
        ];

        let chapters = rows_to_chapters(chapters, scenes).unwrap();
        assert_eq!(chapters[0].number, 1);
        assert_eq!(chapters[0].scenes[0].number, 1);
        assert_eq!(chapters[0].scenes.len(), 2);
        assert!(chapters[1].scenes.is_empty());
    }

    #[test]
    fn oversized_numbers_are_rejected_not_clamped() {
        assert_eq!(number(7).unwrap(), 7);
        let err = number(u32::MAX).unwrap_err();
        assert!(matches!(err.kind, DatabaseErrorKind::Conversion(_)));
        assert!(chapter_to_row(u32::MAX, "Overflow", "").is_err());

        let entry = KnowledgeEntry {
            character: "mara".into(),
            fact: "The ledger is forged".into(),
            visibility: quill_core::Visibility::Secret,
            source: "scene 1.1".into(),
            location: Location::new(1, i32::MAX as u32 + 1),
        };
        assert!(knowledge_to_row(1, &entry).is_err());
        let in_range = KnowledgeEntry {
            location: Location::new(1, 1),
            ..entry
        };
        assert!(knowledge_to_row(1, &in_range).is_ok());
    }
}
