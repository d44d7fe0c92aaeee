//! Plot threads.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle of a plot thread.
///
/// Any status may follow any other; transitions are not policed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PlotStatus {
    /// Thread has been set up
    #[default]
    #[display("introduced")]
    Introduced,
    /// Thread is actively progressing
    #[display("developing")]
    Developing,
    /// Thread has been closed
    #[display("resolved")]
    Resolved,
    /// Thread is paused
    #[display("dormant")]
    Dormant,
}

impl PlotStatus {
    /// Convert to string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotStatus::Introduced => "introduced",
            PlotStatus::Developing => "developing",
            PlotStatus::Resolved => "resolved",
            PlotStatus::Dormant => "dormant",
        }
    }
}

impl FromStr for PlotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "introduced" => Ok(PlotStatus::Introduced),
            "developing" => Ok(PlotStatus::Developing),
            "resolved" => Ok(PlotStatus::Resolved),
            "dormant" => Ok(PlotStatus::Dormant),
            other => Err(format!("Unknown plot status: {}", other)),
        }
    }
}

/// Weight of a plot thread in the overall story.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    /// Central to the story
    #[display("major")]
    Major,
    /// Secondary thread
    #[default]
    #[display("minor")]
    Minor,
    /// Texture only
    #[display("background")]
    Background,
}

impl Importance {
    /// Convert to string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Major => "major",
            Importance::Minor => "minor",
            Importance::Background => "background",
        }
    }
}

impl FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(Importance::Major),
            "minor" => Ok(Importance::Minor),
            "background" => Ok(Importance::Background),
            other => Err(format!("Unknown importance: {}", other)),
        }
    }
}

/// A named storyline, unique by `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlotThread {
    /// Natural key
    pub name: String,
    /// What the thread is about
    pub description: String,
    /// Current status
    #[serde(default)]
    pub status: PlotStatus,
    /// Weight in the story
    #[serde(default)]
    pub importance: Importance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn status_strings_round_trip() {
        for status in PlotStatus::iter() {
            assert_eq!(status.as_str().parse::<PlotStatus>(), Ok(status));
        }
        for importance in Importance::iter() {
            assert_eq!(importance.as_str().parse::<Importance>(), Ok(importance));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Resolved".parse::<PlotStatus>(), Ok(PlotStatus::Resolved));
        assert!("finished".parse::<PlotStatus>().is_err());
    }
}
