use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use progress_core::model::{Progress, ProgressError, ProgressPatchDraft, UserId};

use crate::response::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SaveProgressResponse {
    success: bool,
    user_id: UserId,
    modified: bool,
    updated_at: DateTime<Utc>,
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ResetProgressResponse {
    success: bool,
    user_id: UserId,
    message: &'static str,
}

pub async fn get_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Progress>, AppError> {
    let user_id = UserId::parse(user_id)?;
    let progress = state.progress().get(&user_id).await?;
    Ok(Json(progress))
}

pub async fn save_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<SaveProgressResponse>, AppError> {
    let user_id = UserId::parse(user_id)?;
    let draft = parse_draft(&body)?;
    let outcome = state.progress().upsert(&user_id, draft).await?;

    Ok(Json(SaveProgressResponse {
        success: true,
        user_id,
        modified: outcome.modified,
        updated_at: outcome.updated_at,
        message: "Progress saved successfully",
    }))
}

pub async fn reset_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ResetProgressResponse>, AppError> {
    let user_id = UserId::parse(user_id)?;
    state.progress().reset(&user_id).await?;

    Ok(Json(ResetProgressResponse {
        success: true,
        user_id,
        message: "Progress reset successfully",
    }))
}

/// An empty body is an empty update; anything else must be a JSON object.
fn parse_draft(body: &[u8]) -> Result<ProgressPatchDraft, ProgressError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ProgressPatchDraft::new());
    }
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|err| ProgressError::Malformed(err.to_string()))?;
    ProgressPatchDraft::from_json(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_body_is_empty_update() {
        let draft = parse_draft(b"  \n").unwrap();
        assert!(draft.validate().unwrap().is_empty());
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            parse_draft(b"stars=10"),
            Err(ProgressError::Malformed(_))
        ));
    }

    #[test]
    fn json_array_body_is_malformed() {
        assert!(matches!(parse_draft(b"[1,2]"), Err(ProgressError::Malformed(_))));
    }
}
