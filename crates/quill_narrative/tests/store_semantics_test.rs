//! Upsert and key semantics of the story store as seen by persistence.

use quill_core::{Chapter, Character, Location, Relationship, Scene, WorkingState};
use quill_interface::StoryStore;
use quill_narrative::{InMemoryStoryStore, NodeName, PersistenceManager};
use std::sync::Arc;

fn written_state(content: &str) -> WorkingState {
    let mut state = WorkingState::default();
    let mut chapter = Chapter::new(1, "Arrival", "");
    chapter.upsert_scene(Scene {
        number: 1,
        outline: "the pier".into(),
        content: Some(content.into()),
    });
    state.chapters.push(chapter);
    state.dirty_scene = Some(Location::new(1, 1));
    state
}

fn cast() -> Vec<Character> {
    ["mara", "tobin"]
        .into_iter()
        .map(|id| Character {
            identifier: id.into(),
            name: id.to_uppercase(),
            role: "lead".into(),
            ..Default::default()
        })
        .collect()
}

#[tokio::test]
async fn saving_a_scene_twice_keeps_one_row() {
    let store = InMemoryStoryStore::new();
    let mut manager = PersistenceManager::new(Arc::new(store.clone()));

    assert_eq!(
        manager
            .save_node_state(NodeName::WriteScene, &written_state("First draft."))
            .await,
        0
    );
    assert_eq!(
        manager
            .save_node_state(NodeName::ReviseScene, &written_state("Second draft."))
            .await,
        0
    );

    assert_eq!(store.scene_count().await, 1);
    let chapters = store.list_chapters().await.unwrap();
    assert_eq!(chapters.len(), 1);
    assert_eq!(
        chapters[0].scene(1).unwrap().content.as_deref(),
        Some("Second draft.")
    );
}

#[tokio::test]
async fn recreated_character_keeps_id_and_relationships() {
    let store = InMemoryStoryStore::new();
    let mut state = WorkingState {
        characters: cast(),
        relationships: vec![Relationship::new("mara", "tobin", "rivals")],
        ..Default::default()
    };
    let mut manager = PersistenceManager::new(Arc::new(store.clone()));
    manager
        .save_node_state(NodeName::CreateCharacters, &state)
        .await;
    let original = store.find_character_id("mara").await.unwrap().unwrap();

    state.characters[0].arc = "learns to trust".into();
    let mut fresh = PersistenceManager::new(Arc::new(store.clone()));
    let failures = fresh
        .save_node_state(NodeName::UpdateCharacters, &state)
        .await;

    assert_eq!(failures, 0);
    assert_eq!(store.find_character_id("mara").await.unwrap(), Some(original));
    let characters = store.list_characters().await.unwrap();
    assert_eq!(characters.len(), 2);
    assert_eq!(characters[0].arc, "learns to trust");
    assert_eq!(store.list_relationships().await.unwrap().len(), 1);
}

#[tokio::test]
async fn reversed_pair_addresses_the_same_relationship() {
    let store = InMemoryStoryStore::new();
    let mut ids = Vec::new();
    for character in cast() {
        ids.push(store.upsert_character(&character).await.unwrap());
    }

    let forward = store
        .upsert_relationship(ids[0], ids[1], "strangers")
        .await
        .unwrap();
    let backward = store
        .upsert_relationship(ids[1], ids[0], "allies")
        .await
        .unwrap();

    assert_eq!(forward, backward);
    assert_eq!(store.relationship_count().await, 1);
    let relationships = store.list_relationships().await.unwrap();
    assert_eq!(relationships[0].description, "allies");
    assert_eq!(relationships[0].key(), ("mara", "tobin"));
}

#[tokio::test]
async fn chapter_numbers_are_natural_keys() {
    let store = InMemoryStoryStore::new();
    let first = store.upsert_chapter(2, "Draft", "").await.unwrap();
    let second = store.upsert_chapter(2, "Final", "The storm").await.unwrap();
    store.upsert_chapter(1, "Opening", "").await.unwrap();

    assert_eq!(first, second);
    let chapters = store.list_chapters().await.unwrap();
    let numbers: Vec<u32> = chapters.iter().map(|c| c.number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(chapters[1].title, "Final");
}

#[tokio::test]
async fn nodes_without_strategy_write_nothing() {
    let store = InMemoryStoryStore::new();
    let mut manager = PersistenceManager::new(Arc::new(store.clone()));

    let failures = manager
        .save_node_state(NodeName::Reflect, &written_state("Unsaved."))
        .await;

    assert_eq!(failures, 0);
    assert_eq!(store.scene_count().await, 0);
}
