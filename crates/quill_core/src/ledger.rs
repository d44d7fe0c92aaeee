//! Records held by the consistency ledger.

use crate::Location;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Who knows a fact.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Only the holder knows it
    #[display("secret")]
    Secret,
    /// The holder has disclosed it
    #[display("revealed")]
    Revealed,
    /// Commonly known
    #[display("public")]
    Public,
}

impl Visibility {
    /// Convert to string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Secret => "secret",
            Visibility::Revealed => "revealed",
            Visibility::Public => "public",
        }
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "secret" => Ok(Visibility::Secret),
            "revealed" => Ok(Visibility::Revealed),
            "public" => Ok(Visibility::Public),
            other => Err(format!("Unknown visibility: {}", other)),
        }
    }
}

/// A fact held by a character from a given point in the story.
///
/// Entries are append-only; the single permitted mutation is
/// `secret` to `revealed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Character identifier
    pub character: String,
    /// The fact itself
    pub fact: String,
    /// Who knows it
    pub visibility: Visibility,
    /// How the character learned it
    pub source: String,
    /// Where the character learned it
    pub location: Location,
}

/// Marker that a one-time story beat has happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    /// Unique progression key
    pub key: String,
    /// Where the beat happened
    pub location: Location,
    /// What happened
    pub description: String,
}

/// A phrase that has already been used, unique by `(phrase, phrase_type)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhraseRecord {
    /// The phrase text
    pub phrase: String,
    /// Category (e.g. "opening", "dialogue", "description")
    pub phrase_type: String,
    /// First use
    pub location: Location,
}

/// Structural fingerprint of a written scene, unique by location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStructureRecord {
    /// Scene this fingerprint describes
    pub location: Location,
    /// Kind of scene ("action", "dialogue", "introspection", ...)
    pub scene_type: String,
    /// How the scene opens
    pub opening: String,
    /// Peak moment
    pub climax: String,
    /// How the scene closes
    pub resolution: String,
    /// Compact pattern string (e.g. "dialogue-conflict-cliffhanger")
    pub pattern: String,
}
