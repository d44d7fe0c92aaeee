//! Scene structure fingerprints and the variety score.

use super::ConsistencyLedger;
use quill_core::SceneStructureRecord;
use quill_error::QuillResult;
use std::collections::HashMap;

impl ConsistencyLedger {
    /// Store the structural fingerprint of a scene, replacing any earlier one
    /// for the same location.
    #[tracing::instrument(skip_all, fields(location = %record.location, pattern = %record.pattern))]
    pub async fn record_structure(&self, record: &SceneStructureRecord) -> QuillResult<()> {
        self.store().upsert_scene_structure(record).await
    }

    /// Pattern strings in reading order.
    pub async fn patterns(&self) -> QuillResult<Vec<String>> {
        Ok(self
            .store()
            .list_scene_structures()
            .await?
            .into_iter()
            .map(|r| r.pattern)
            .collect())
    }

    /// The last `limit` fingerprints in reading order, with their
    /// opening, climax and resolution descriptors.
    pub async fn detailed(&self, limit: usize) -> QuillResult<Vec<SceneStructureRecord>> {
        let records = self.store().list_scene_structures().await?;
        let skip = records.len().saturating_sub(limit);
        Ok(records.into_iter().skip(skip).collect())
    }

    /// Variety over the last `window` scenes.
    pub async fn variety_score(&self, window: usize) -> QuillResult<f64> {
        let recent = self.detailed(window).await?;
        let patterns: Vec<&str> = recent.iter().map(|r| r.pattern.as_str()).collect();
        Ok(variety_score(&patterns))
    }
}

/// `1 - dominant / n`, where `dominant` is the count of the most common
/// pattern among the `n` given. No history scores 1.0.
pub(crate) fn variety_score(patterns: &[&str]) -> f64 {
    if patterns.is_empty() {
        return 1.0;
    }
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for pattern in patterns {
        *counts.entry(*pattern).or_default() += 1;
    }
    let dominant = counts.values().copied().max().unwrap_or(0);
    1.0 - dominant as f64 / patterns.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_history_scores_zero() {
        assert_eq!(variety_score(&["a", "a", "a"]), 0.0);
    }

    #[test]
    fn mixed_history_scores_by_dominant_share() {
        let score = variety_score(&["a", "b", "a", "c"]);
        assert!((score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_history_is_fully_varied() {
        assert_eq!(variety_score(&[]), 1.0);
    }
}
