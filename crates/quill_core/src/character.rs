//! Characters and their relationships.

use serde::{Deserialize, Serialize};

/// A story character, keyed by a stable `identifier` distinct from the
/// display name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Character {
    /// Stable natural key (e.g. "mara_vance")
    pub identifier: String,
    /// Display name
    pub name: String,
    /// Narrative role (protagonist, antagonist, ...)
    pub role: String,
    /// Physical and psychological profile
    pub profile: String,
    /// What the character wants
    pub motivation: String,
    /// Current state of the character's arc
    pub arc: String,
}

/// An undirected relationship between two characters.
///
/// The pair is normalized on construction so `(a, b)` and `(b, a)` compare
/// equal.
///
/// # Examples
///
/// ```
/// use quill_core::Relationship;
///
/// let ab = Relationship::new("ada", "bram", "rivals");
/// let ba = Relationship::new("bram", "ada", "rivals");
/// assert_eq!(ab.key(), ba.key());
/// assert!(ab.involves("bram"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    first: String,
    second: String,
    /// Free-text description of the bond
    pub description: String,
}

impl Relationship {
    /// Create a relationship, normalizing the pair order.
    pub fn new(a: impl Into<String>, b: impl Into<String>, description: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first,
            second,
            description: description.into(),
        }
    }

    /// Lexicographically smaller identifier of the pair.
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Lexicographically larger identifier of the pair.
    pub fn second(&self) -> &str {
        &self.second
    }

    /// The normalized pair.
    pub fn key(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }

    /// True if `identifier` is either end of the relationship.
    pub fn involves(&self, identifier: &str) -> bool {
        self.first == identifier || self.second == identifier
    }
}
