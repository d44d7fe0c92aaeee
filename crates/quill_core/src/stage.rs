//! Per-scene lifecycle.

use serde::{Deserialize, Serialize};

/// Where the current scene sits in its lifecycle.
///
/// `Written`, `Reflected` and `Revised` may cycle, bounded by the configured
/// regeneration limit, before `Accepted`.
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
pub enum SceneStage {
    /// Slot exists in the chapter plan
    #[default]
    Planned,
    /// A brief has been produced
    Brainstormed,
    /// First draft exists
    Written,
    /// Draft has been critiqued
    Reflected,
    /// Draft has been rewritten after critique
    Revised,
    /// Draft is final
    Accepted,
    /// Final draft and its side effects are stored
    Persisted,
}

impl SceneStage {
    /// True if `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: SceneStage) -> bool {
        use SceneStage::*;
        matches!(
            (self, next),
            (Planned, Brainstormed)
                | (Brainstormed, Written)
                | (Written, Reflected)
                | (Reflected, Revised)
                | (Reflected, Accepted)
                | (Revised, Reflected)
                | (Accepted, Persisted)
                | (Persisted, Planned)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_cycle_is_legal() {
        assert!(SceneStage::Written.can_advance_to(SceneStage::Reflected));
        assert!(SceneStage::Reflected.can_advance_to(SceneStage::Revised));
        assert!(SceneStage::Revised.can_advance_to(SceneStage::Reflected));
        assert!(!SceneStage::Planned.can_advance_to(SceneStage::Accepted));
    }
}
