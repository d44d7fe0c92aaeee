//! Scene addressing.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Position of a scene within the story.
///
/// Locations order first by chapter, then by scene, so sorting a list of
/// locations yields reading order.
///
/// # Examples
///
/// ```
/// use quill_core::Location;
///
/// let a = Location::new(1, 3);
/// let b = Location::new(2, 1);
/// assert!(a < b);
/// assert_eq!(a.to_string(), "1.3");
/// assert_eq!("2.1".parse::<Location>().unwrap(), b);
/// ```
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
    derive_more::Display,
)]
#[display("{}.{}", chapter, scene)]
pub struct Location {
    /// 1-based chapter number
    pub chapter: u32,
    /// 1-based scene number within the chapter
    pub scene: u32,
}

impl Location {
    /// Create a location.
    pub fn new(chapter: u32, scene: u32) -> Self {
        Self { chapter, scene }
    }

    /// The opening scene of the story.
    pub fn first() -> Self {
        Self::new(1, 1)
    }

    /// The following scene in the same chapter.
    pub fn next_scene(&self) -> Self {
        Self::new(self.chapter, self.scene + 1)
    }

    /// The opening scene of the following chapter.
    pub fn next_chapter(&self) -> Self {
        Self::new(self.chapter + 1, 1)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::first()
    }
}

/// Error returned when a string is not a `chapter.scene` pair.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("Invalid location '{}': expected 'chapter.scene'", input)]
pub struct ParseLocationError {
    /// The rejected input
    pub input: String,
}

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLocationError {
            input: s.to_string(),
        };
        let (chapter, scene) = s.trim().split_once('.').ok_or_else(err)?;
        let chapter = chapter.trim().parse::<u32>().map_err(|_| err())?;
        let scene = scene.trim().parse::<u32>().map_err(|_| err())?;
        if chapter == 0 || scene == 0 {
            return Err(err());
        }
        Ok(Self::new(chapter, scene))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_chapter_then_scene() {
        let mut locations = vec![
            Location::new(2, 1),
            Location::new(1, 10),
            Location::new(1, 2),
        ];
        locations.sort();
        assert_eq!(
            locations,
            vec![Location::new(1, 2), Location::new(1, 10), Location::new(2, 1)]
        );
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!("3".parse::<Location>().is_err());
        assert!("a.b".parse::<Location>().is_err());
        assert!("0.1".parse::<Location>().is_err());
    }

    #[test]
    fn steps_forward() {
        let loc = Location::new(2, 3);
        assert_eq!(loc.next_scene(), Location::new(2, 4));
        assert_eq!(loc.next_chapter(), Location::new(3, 1));
    }
}
