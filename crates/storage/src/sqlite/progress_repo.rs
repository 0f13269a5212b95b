use async_trait::async_trait;
use chrono::{DateTime, Utc};
use progress_core::model::{
    DEFAULT_LEVEL, DEFAULT_STARS, Language, Progress, ProgressPatch, ProgressTotals, UserId,
};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{
    encode_set, map_progress_row, ser, timestamp_from_micros, timestamp_to_micros,
};
use crate::repository::{
    MergeOutcome, MergeReceipt, ProgressRepository, ProgressStatsRepository, StorageError,
};

fn u64_total(field: &'static str, raw: i64) -> Result<u64, StorageError> {
    u64::try_from(raw).map_err(|_| StorageError::Serialization(format!("negative {field}: {raw}")))
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self, user_id: &UserId) -> Result<Option<Progress>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT user_id, stars, level, letters_completed, words_completed,
                   math_completed, tracing_completed, language, updated_at
            FROM progress
            WHERE user_id = ?1
            ",
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn merge_progress(
        &self,
        user_id: &UserId,
        patch: &ProgressPatch,
        at: DateTime<Utc>,
    ) -> Result<MergeReceipt, StorageError> {
        let letters = patch.letters_completed().map(encode_set).transpose()?;
        let words = patch.words_completed().map(encode_set).transpose()?;
        let math = patch.math_completed().map(encode_set).transpose()?;
        let tracing_items = patch.tracing_completed().map(encode_set).transpose()?;

        // One statement: the insert-or-merge is atomic per user, and `revision`
        // tells a fresh insert (0) apart from an update (> 0).
        let row = sqlx::query(
            r"
            INSERT INTO progress (
                user_id, stars, level, letters_completed, words_completed,
                math_completed, tracing_completed, language, updated_at, revision
            )
            VALUES (
                ?1,
                COALESCE(?2, ?10),
                COALESCE(?3, ?11),
                COALESCE(?4, '[]'),
                COALESCE(?5, '[]'),
                COALESCE(?6, '[]'),
                COALESCE(?7, '[]'),
                COALESCE(?8, ?12),
                ?9,
                0
            )
            ON CONFLICT(user_id) DO UPDATE SET
                stars = COALESCE(?2, progress.stars),
                level = COALESCE(?3, progress.level),
                letters_completed = COALESCE(?4, progress.letters_completed),
                words_completed = COALESCE(?5, progress.words_completed),
                math_completed = COALESCE(?6, progress.math_completed),
                tracing_completed = COALESCE(?7, progress.tracing_completed),
                language = COALESCE(?8, progress.language),
                updated_at = MAX(?9, progress.updated_at),
                revision = progress.revision + 1
            RETURNING revision, updated_at
            ",
        )
        .bind(user_id.as_str())
        .bind(patch.stars().map(i64::from))
        .bind(patch.level().map(i64::from))
        .bind(letters)
        .bind(words)
        .bind(math)
        .bind(tracing_items)
        .bind(patch.language().map(Language::as_str))
        .bind(timestamp_to_micros(at))
        .bind(i64::from(DEFAULT_STARS))
        .bind(i64::from(DEFAULT_LEVEL))
        .bind(Language::default().as_str())
        .fetch_one(&self.pool)
        .await?;

        let revision: i64 = row.try_get("revision").map_err(ser)?;
        let updated_at = timestamp_from_micros(row.try_get("updated_at").map_err(ser)?)?;
        let outcome = if revision == 0 {
            MergeOutcome::Created
        } else {
            MergeOutcome::Updated
        };

        tracing::debug!(
            user_id = %user_id,
            revision,
            created = !outcome.modified(),
            "merged progress"
        );

        Ok(MergeReceipt {
            outcome,
            updated_at,
        })
    }

    async fn delete_progress(&self, user_id: &UserId) -> Result<bool, StorageError> {
        let res = sqlx::query("DELETE FROM progress WHERE user_id = ?1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ProgressStatsRepository for SqliteRepository {
    async fn progress_totals(&self) -> Result<ProgressTotals, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(*) AS users,
                COALESCE(SUM(stars), 0) AS stars,
                COALESCE(SUM(level), 0) AS level_sum,
                MAX(level) AS max_level
            FROM progress
            ",
        )
        .fetch_one(&self.pool)
        .await?;

        let max_level = row
            .try_get::<Option<i64>, _>("max_level")
            .map_err(ser)?
            .map(|raw| {
                u32::try_from(raw)
                    .map_err(|_| StorageError::Serialization(format!("invalid max_level: {raw}")))
            })
            .transpose()?;

        Ok(ProgressTotals {
            users: u64_total("users", row.try_get("users").map_err(ser)?)?,
            stars: u64_total("stars", row.try_get("stars").map_err(ser)?)?,
            level_sum: u64_total("level_sum", row.try_get("level_sum").map_err(ser)?)?,
            max_level,
        })
    }
}
