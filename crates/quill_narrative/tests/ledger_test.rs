//! Consistency ledger behavior over the in-memory store.

use quill_core::{Character, KnowledgeEntry, Location, SceneStructureRecord, Visibility};
use quill_interface::StoryStore;
use quill_narrative::{ConsistencyLedger, InMemoryStoryStore};
use std::sync::Arc;

async fn ledger_with_cast(names: &[&str]) -> ConsistencyLedger {
    let store = InMemoryStoryStore::new();
    for name in names {
        store
            .upsert_character(&Character {
                identifier: name.to_string(),
                name: name.to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    ConsistencyLedger::new(Arc::new(store))
}

fn secret(character: &str, fact: &str) -> KnowledgeEntry {
    KnowledgeEntry {
        character: character.into(),
        fact: fact.into(),
        visibility: Visibility::Secret,
        source: "backstory".into(),
        location: Location::new(1, 1),
    }
}

#[tokio::test]
async fn progression_is_tracked_once() {
    let ledger = ledger_with_cast(&[]).await;

    assert!(!ledger.exists("duel").await.unwrap());
    assert!(ledger.track("duel", Location::new(1, 2), "The duel at dawn").await.unwrap());
    assert!(!ledger.track("duel", Location::new(3, 1), "Again").await.unwrap());
    assert!(ledger.exists("duel").await.unwrap());
}

#[tokio::test]
async fn reveal_moves_a_secret_to_recipients() {
    let ledger = ledger_with_cast(&["tobin", "mara", "ivo"]).await;
    ledger
        .add_knowledge(&secret("tobin", "Tobin forged the deed"))
        .await
        .unwrap();

    let revealed = ledger
        .reveal(
            "tobin",
            "Tobin forged the deed",
            Location::new(2, 1),
            &["mara".to_string(), "stranger".to_string()],
        )
        .await
        .unwrap();
    assert!(revealed);

    let tobin = ledger.query_knowledge("tobin", None, None).await.unwrap();
    assert_eq!(tobin[0].visibility, Visibility::Revealed);
    let mara = ledger
        .query_knowledge("mara", None, Some(Visibility::Public))
        .await
        .unwrap();
    assert_eq!(mara.len(), 1);
    assert_eq!(mara[0].source, "revealed by tobin");
    assert_eq!(mara[0].location, Location::new(2, 1));
    assert!(ledger.query_knowledge("ivo", None, None).await.unwrap().is_empty());

    // already revealed
    assert!(
        !ledger
            .reveal("tobin", "Tobin forged the deed", Location::new(2, 2), &[])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn knowledge_as_of_excludes_later_scenes() {
    let ledger = ledger_with_cast(&["mara"]).await;
    let mut late = secret("mara", "The lighthouse is empty");
    late.location = Location::new(3, 1);
    ledger.add_knowledge(&secret("mara", "Her brother is alive")).await.unwrap();
    ledger.add_knowledge(&late).await.unwrap();
    assert!(!ledger.add_knowledge(&late).await.unwrap());

    let early = ledger
        .query_knowledge("mara", Some(Location::new(2, 5)), None)
        .await
        .unwrap();
    assert_eq!(early.len(), 1);
    assert_eq!(early[0].fact, "Her brother is alive");
}

#[tokio::test]
async fn unknown_character_is_an_error() {
    let ledger = ledger_with_cast(&["mara"]).await;
    assert!(ledger.add_knowledge(&secret("nobody", "x")).await.is_err());
    assert!(ledger.query_knowledge("nobody", None, None).await.is_err());
}

#[tokio::test]
async fn phrases_are_deduplicated_per_type() {
    let ledger = ledger_with_cast(&[]).await;
    let phrases = vec!["salt-stiff air".to_string(), "grey tide".to_string()];

    let added = ledger
        .add_phrases(Location::new(1, 1), "description", &phrases)
        .await
        .unwrap();
    let again = ledger
        .add_phrases(Location::new(1, 2), "description", &phrases)
        .await
        .unwrap();
    ledger
        .add_phrases(Location::new(1, 2), "opening", &phrases[..1])
        .await
        .unwrap();

    assert_eq!((added, again), (2, 0));
    assert_eq!(ledger.used_phrases(Some("opening")).await.unwrap(), vec!["salt-stiff air"]);
    assert_eq!(ledger.used_phrases(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn repeated_scene_types_lower_the_variety_score() {
    let ledger = ledger_with_cast(&[]).await;
    for (scene, scene_type) in ["dialogue", "dialogue", "dialogue", "action"].iter().enumerate() {
        ledger
            .record_structure(&SceneStructureRecord {
                location: Location::new(1, scene as u32 + 1),
                scene_type: scene_type.to_string(),
                opening: String::new(),
                climax: String::new(),
                resolution: String::new(),
                pattern: format!("{}-beat", scene_type),
            })
            .await
            .unwrap();
    }

    let score = ledger.variety_score(4).await.unwrap();
    assert!((score - 0.25).abs() < f64::EPSILON);
    assert_eq!(ledger.detailed(2).await.unwrap().len(), 2);
    assert_eq!(ledger.patterns().await.unwrap().len(), 4);
}
