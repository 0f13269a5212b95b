use std::sync::Arc;

use progress_core::model::ProgressStats;
use storage::repository::ProgressStatsRepository;

use crate::error::StatsServiceError;

/// Summarises progress across all learners.
#[derive(Clone)]
pub struct StatsService {
    stats: Arc<dyn ProgressStatsRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(stats: Arc<dyn ProgressStatsRepository>) -> Self {
        Self { stats }
    }

    /// Compute user count, star total, and average/max level over stored records.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::StorageUnavailable` if the store cannot be scanned.
    pub async fn compute(&self) -> Result<ProgressStats, StatsServiceError> {
        let totals = self.stats.progress_totals().await?;
        let stats = ProgressStats::from_totals(&totals);
        tracing::debug!(
            total_users = stats.total_users,
            total_stars = stats.total_stars,
            average_level = stats.average_level,
            max_level = stats.max_level,
            "computed progress stats"
        );
        Ok(stats)
    }
}
