use async_trait::async_trait;
use chrono::{DateTime, Utc};
use progress_core::model::{Progress, ProgressPatch, ProgressTotals, UserId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// The backend could not be reached, timed out, or did not acknowledge a write.
    #[error("connection error: {0}")]
    Connection(String),

    /// A stored row could not be mapped to or from the domain shape.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => StorageError::Serialization(err.to_string()),
            other => StorageError::Connection(other.to_string()),
        }
    }
}

/// Whether a merge created the record or changed an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    Created,
    Updated,
}

impl MergeOutcome {
    /// `false` for a brand-new record, `true` when an existing one was changed.
    #[must_use]
    pub fn modified(self) -> bool {
        matches!(self, MergeOutcome::Updated)
    }
}

/// Acknowledgement of a successful merge-upsert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeReceipt {
    pub outcome: MergeOutcome,
    /// The write time the store kept for the record.
    pub updated_at: DateTime<Utc>,
}

/// Repository contract for per-user progress records.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the stored record for a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_progress(&self, user_id: &UserId) -> Result<Option<Progress>, StorageError>;

    /// Atomically merge the supplied fields, inserting the record if absent.
    ///
    /// Fields not present in `patch` keep their stored values (or defaults on
    /// insert). `updated_at` becomes the later of `at` and the stored time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write cannot be applied; nothing is written
    /// in that case.
    async fn merge_progress(
        &self,
        user_id: &UserId,
        patch: &ProgressPatch,
        at: DateTime<Utc>,
    ) -> Result<MergeReceipt, StorageError>;

    /// Remove the record for a user. Returns whether a record existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn delete_progress(&self, user_id: &UserId) -> Result<bool, StorageError>;

    /// Cheap round-trip used by health checks.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend is unreachable.
    async fn ping(&self) -> Result<(), StorageError>;
}

/// Read-only aggregate access over all stored progress records.
#[async_trait]
pub trait ProgressStatsRepository: Send + Sync {
    /// Scan every stored record and return the raw totals.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn progress_totals(&self) -> Result<ProgressTotals, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<UserId, Progress>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            progress: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, user_id: &UserId) -> Result<Option<Progress>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user_id).cloned())
    }

    async fn merge_progress(
        &self,
        user_id: &UserId,
        patch: &ProgressPatch,
        at: DateTime<Utc>,
    ) -> Result<MergeReceipt, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let (outcome, record) = match guard.entry(user_id.clone()) {
            Entry::Occupied(entry) => {
                let existing = entry.into_mut();
                existing.merge(patch, at);
                (MergeOutcome::Updated, existing)
            }
            Entry::Vacant(entry) => {
                let created = Progress::created_from(user_id.clone(), patch, at);
                (MergeOutcome::Created, entry.insert(created))
            }
        };

        let updated_at = record
            .updated_at()
            .ok_or_else(|| StorageError::Serialization("merged record lost updated_at".into()))?;
        Ok(MergeReceipt {
            outcome,
            updated_at,
        })
    }

    async fn delete_progress(&self, user_id: &UserId) -> Result<bool, StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.remove(user_id).is_some())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        self.progress
            .lock()
            .map(|_| ())
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgressStatsRepository for InMemoryRepository {
    async fn progress_totals(&self) -> Result<ProgressTotals, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut totals = ProgressTotals::default();
        for progress in guard.values() {
            totals.record(progress.stars(), progress.level());
        }
        Ok(totals)
    }
}

/// Bundles the progress repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub stats: Arc<dyn ProgressStatsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let stats: Arc<dyn ProgressStatsRepository> = Arc::new(repo);
        Self { progress, stats }
    }
}
