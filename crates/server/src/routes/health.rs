use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    app: &'static str,
    version: &'static str,
    status: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
    timestamp: String,
    uptime: u64,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        app: "Tanga Kudzidza API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

pub async fn health(State(state): State<AppState>) -> Response {
    let connected = state.progress().storage_available().await;

    let response = HealthResponse {
        status: if connected { "healthy" } else { "degraded" },
        database: if connected { "connected" } else { "disconnected" },
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.uptime_seconds(),
    };

    let status_code = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}
