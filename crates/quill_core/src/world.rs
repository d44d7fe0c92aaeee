//! Worldbuilding entries.

use serde::{Deserialize, Serialize};

/// A named element of the story world (place, faction, custom, artifact).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldElement {
    /// Natural key
    pub name: String,
    /// Free-form category ("location", "faction", ...)
    pub category: String,
    /// Description
    pub description: String,
}
