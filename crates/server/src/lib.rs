#![forbid(unsafe_code)]

pub mod config;
pub mod logging;
pub mod response;
pub mod routes;
pub mod state;

use services::AppServices;

use crate::config::Config;
use crate::state::AppState;

/// Build the full HTTP application over already-constructed services.
pub fn create_app(services: &AppServices, config: &Config) -> axum::Router {
    routes::app(AppState::new(services), &config.allowed_origins)
}
