use axum::Json;
use axum::extract::State;

use progress_core::model::ProgressStats;

use crate::response::AppError;
use crate::state::AppState;

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<ProgressStats>, AppError> {
    let stats = state.stats().compute().await?;
    Ok(Json(stats))
}
