mod health;
mod progress;
mod stats;

use axum::Router;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AllowedOrigins;
use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/api/health", get(health::health))
        .route(
            "/api/progress/:user_id",
            get(progress::get_progress)
                .post(progress::save_progress)
                .delete(progress::reset_progress),
        )
        .route("/api/stats", get(stats::get_stats))
        .fallback(fallback_handler)
        .with_state(state)
}

/// Router with request tracing and the configured CORS policy.
pub fn app(state: AppState, origins: &AllowedOrigins) -> Router {
    router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(origins))
}

pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    match origins {
        AllowedOrigins::Any => CorsLayer::permissive(),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(values)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

async fn fallback_handler() -> Response {
    AppError::not_found("Not Found").into_response()
}
