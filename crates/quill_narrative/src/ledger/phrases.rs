//! Used-phrase ledger.

use super::ConsistencyLedger;
use quill_core::{Location, PhraseRecord};
use quill_error::QuillResult;

impl ConsistencyLedger {
    /// Record phrases of one type used at `location`.
    ///
    /// Returns how many were new. A phrase already recorded with the same
    /// type is skipped silently.
    #[tracing::instrument(skip(self, phrases), fields(%location, count = phrases.len()))]
    pub async fn add_phrases(
        &self,
        location: Location,
        phrase_type: &str,
        phrases: &[String],
    ) -> QuillResult<usize> {
        let mut added = 0;
        for phrase in phrases {
            let phrase = phrase.trim();
            if phrase.is_empty() {
                continue;
            }
            let record = PhraseRecord {
                phrase: phrase.to_string(),
                phrase_type: phrase_type.to_string(),
                location,
            };
            if self.store().insert_phrase(&record).await? {
                added += 1;
            }
        }
        tracing::debug!(added, "Phrases recorded");
        Ok(added)
    }

    /// Phrases already used, optionally of one type, oldest first.
    pub async fn used_phrases(&self, phrase_type: Option<&str>) -> QuillResult<Vec<String>> {
        let records = self.store().list_phrases(phrase_type).await?;
        let mut seen = std::collections::HashSet::new();
        Ok(records
            .into_iter()
            .filter_map(|r| seen.insert(r.phrase.clone()).then_some(r.phrase))
            .collect())
    }

    /// The `limit` most recent used phrases, newest last.
    pub async fn recent_phrases(&self, limit: usize) -> QuillResult<Vec<String>> {
        let all = self.used_phrases(None).await?;
        let skip = all.len().saturating_sub(limit);
        Ok(all.into_iter().skip(skip).collect())
    }
}
