use std::sync::Arc;

use chrono::{DateTime, Utc};
use progress_core::model::{Progress, ProgressPatch, ProgressPatchDraft, UserId};
use storage::repository::ProgressRepository;

use crate::Clock;
use crate::error::ProgressServiceError;

/// Result of a successful save.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    /// `false` when the save created the record, `true` when it updated one.
    pub modified: bool,
    pub updated_at: DateTime<Utc>,
}

/// Reads, merges and resets per-user progress.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self { clock, progress }
    }

    /// Fetch a user's progress, or the virtual default if nothing was stored yet.
    ///
    /// The default is not written back.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::StorageUnavailable` if the store cannot be read.
    pub async fn get(&self, user_id: &UserId) -> Result<Progress, ProgressServiceError> {
        let stored = self.progress.get_progress(user_id).await?;
        Ok(stored.unwrap_or_else(|| Progress::virtual_default(user_id.clone())))
    }

    /// Validate a client draft and merge it into the user's record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::InvalidInput` if the draft fails validation
    /// (nothing is written), or `StorageUnavailable` if the write fails.
    pub async fn upsert(
        &self,
        user_id: &UserId,
        draft: ProgressPatchDraft,
    ) -> Result<SaveOutcome, ProgressServiceError> {
        let patch = draft.validate().inspect_err(|err| {
            tracing::debug!(user_id = %user_id, error = %err, "rejected progress update");
        })?;
        self.save(user_id, &patch).await
    }

    /// Merge an already validated patch, creating the record if absent.
    ///
    /// `updated_at` is refreshed even when the patch supplies no fields.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::StorageUnavailable` if the write fails.
    pub async fn save(
        &self,
        user_id: &UserId,
        patch: &ProgressPatch,
    ) -> Result<SaveOutcome, ProgressServiceError> {
        let now = self.clock.now();
        let receipt = self
            .progress
            .merge_progress(user_id, patch, now)
            .await
            .inspect_err(|err| {
                tracing::warn!(user_id = %user_id, error = %err, "progress write failed");
            })?;

        let modified = receipt.outcome.modified();
        tracing::info!(
            user_id = %user_id,
            fields = ?patch.field_names(),
            modified,
            "progress saved"
        );

        Ok(SaveOutcome {
            modified,
            updated_at: receipt.updated_at,
        })
    }

    /// Remove a user's record. Succeeds when there is nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::StorageUnavailable` if the delete fails.
    pub async fn reset(&self, user_id: &UserId) -> Result<(), ProgressServiceError> {
        let existed = self.progress.delete_progress(user_id).await?;
        tracing::info!(user_id = %user_id, existed, "progress reset");
        Ok(())
    }

    /// Whether the backing store answers a round-trip.
    pub async fn storage_available(&self) -> bool {
        match self.progress.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "storage ping failed");
                false
            }
        }
    }
}
