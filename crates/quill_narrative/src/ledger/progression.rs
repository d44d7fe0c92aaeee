//! One-time plot beats.

use super::ConsistencyLedger;
use quill_core::{Location, ProgressionRecord};
use quill_error::QuillResult;

impl ConsistencyLedger {
    /// Mark the beat `key` as told at `location`.
    ///
    /// Returns `true` the first time and `false` on every later call, which
    /// leaves the original record untouched. `false` means the beat already
    /// happened and should not be generated again.
    #[tracing::instrument(skip(self, description), fields(%location))]
    pub async fn track(
        &self,
        key: &str,
        location: Location,
        description: &str,
    ) -> QuillResult<bool> {
        let record = ProgressionRecord {
            key: key.to_string(),
            location,
            description: description.to_string(),
        };
        let inserted = self.store().insert_progression(&record).await?;
        if !inserted {
            tracing::debug!(key, "Progression already tracked");
        }
        Ok(inserted)
    }

    /// True if the beat `key` has been told.
    pub async fn exists(&self, key: &str) -> QuillResult<bool> {
        Ok(self.store().find_progression(key).await?.is_some())
    }
}
