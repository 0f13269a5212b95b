//! Shared error types for the services crate.

use thiserror::Error;

use progress_core::model::ProgressError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    /// A supplied field failed validation; nothing was written.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ProgressError),
    /// The backing store could not be reached or did not acknowledge the write.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

impl ProgressServiceError {
    /// Whether the caller may retry the same request unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

/// Errors emitted by `StatsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsServiceError {
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),
}

impl StatsServiceError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
