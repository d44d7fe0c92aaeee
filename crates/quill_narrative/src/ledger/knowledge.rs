//! Per-character knowledge.

use super::ConsistencyLedger;
use quill_core::{KnowledgeEntry, Location, Visibility};
use quill_error::{QuillResult, StoreError, StoreErrorKind};
use quill_interface::RowId;

impl ConsistencyLedger {
    async fn character_id(&self, identifier: &str) -> QuillResult<RowId> {
        self.store()
            .find_character_id(identifier)
            .await?
            .ok_or_else(|| {
                StoreError::new(StoreErrorKind::NotFound(format!("character '{}'", identifier)))
                    .into()
            })
    }

    /// Record that `entry.character` knows `entry.fact`.
    ///
    /// Returns `false` if the character already knew it.
    #[tracing::instrument(skip_all, fields(character = %entry.character, visibility = %entry.visibility))]
    pub async fn add_knowledge(&self, entry: &KnowledgeEntry) -> QuillResult<bool> {
        let id = self.character_id(&entry.character).await?;
        self.store().insert_knowledge(id, entry).await
    }

    /// What `character` knows, optionally only as of a location and only of
    /// one visibility.
    pub async fn query_knowledge(
        &self,
        character: &str,
        as_of: Option<Location>,
        visibility: Option<Visibility>,
    ) -> QuillResult<Vec<KnowledgeEntry>> {
        let id = self.character_id(character).await?;
        Ok(self
            .store()
            .list_knowledge(id)
            .await?
            .into_iter()
            .filter(|k| as_of.is_none_or(|at| k.location <= at))
            .filter(|k| visibility.is_none_or(|v| k.visibility == v))
            .collect())
    }

    /// Reveal a secret of `character` to each of `reveal_to`.
    ///
    /// Succeeds only while the fact is still secret for `character`: the
    /// entry flips to revealed and every recipient gains a public entry.
    /// Unknown recipients are skipped.
    #[tracing::instrument(skip(self, fact, reveal_to), fields(%location, recipients = reveal_to.len()))]
    pub async fn reveal(
        &self,
        character: &str,
        fact: &str,
        location: Location,
        reveal_to: &[String],
    ) -> QuillResult<bool> {
        let id = self.character_id(character).await?;
        if !self.store().reveal_knowledge(id, fact).await? {
            tracing::debug!(character, "Nothing secret to reveal");
            return Ok(false);
        }
        for recipient in reveal_to {
            let Some(recipient_id) = self.store().find_character_id(recipient).await? else {
                tracing::warn!(recipient = %recipient, "Reveal recipient is not in the cast, skipping");
                continue;
            };
            let entry = KnowledgeEntry {
                character: recipient.clone(),
                fact: fact.to_string(),
                visibility: Visibility::Public,
                source: format!("revealed by {}", character),
                location,
            };
            self.store().insert_knowledge(recipient_id, &entry).await?;
        }
        Ok(true)
    }
}
