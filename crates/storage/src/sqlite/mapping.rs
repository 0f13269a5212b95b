use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use progress_core::model::{Language, Progress, UserId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn timestamp_to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

pub(crate) fn timestamp_from_micros(micros: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or_else(|| StorageError::Serialization(format!("invalid updated_at: {micros}")))
}

pub(crate) fn encode_set<T: Serialize>(set: &BTreeSet<T>) -> Result<String, StorageError> {
    serde_json::to_string(set).map_err(ser)
}

fn decode_set<T: DeserializeOwned + Ord>(
    field: &'static str,
    raw: &str,
) -> Result<BTreeSet<T>, StorageError> {
    serde_json::from_str(raw)
        .map_err(|e| StorageError::Serialization(format!("invalid {field}: {e}")))
}

fn u32_column(row: &SqliteRow, field: &'static str) -> Result<u32, StorageError> {
    let raw: i64 = row.try_get(field).map_err(ser)?;
    u32::try_from(raw).map_err(|_| StorageError::Serialization(format!("invalid {field}: {raw}")))
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<Progress, StorageError> {
    let user_id = UserId::parse(row.try_get::<String, _>("user_id").map_err(ser)?).map_err(ser)?;
    let language = row
        .try_get::<String, _>("language")
        .map_err(ser)?
        .parse::<Language>()
        .map_err(ser)?;
    let updated_at = timestamp_from_micros(row.try_get::<i64, _>("updated_at").map_err(ser)?)?;

    Progress::from_persisted(
        user_id,
        u32_column(row, "stars")?,
        u32_column(row, "level")?,
        decode_set(
            "letters_completed",
            &row.try_get::<String, _>("letters_completed").map_err(ser)?,
        )?,
        decode_set(
            "words_completed",
            &row.try_get::<String, _>("words_completed").map_err(ser)?,
        )?,
        decode_set(
            "math_completed",
            &row.try_get::<String, _>("math_completed").map_err(ser)?,
        )?,
        decode_set(
            "tracing_completed",
            &row.try_get::<String, _>("tracing_completed").map_err(ser)?,
        )?,
        language,
        Some(updated_at),
    )
    .map_err(ser)
}
