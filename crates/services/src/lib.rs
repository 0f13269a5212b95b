#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_service;
pub mod stats_service;

pub use progress_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressServiceError, StatsServiceError};
pub use progress_service::{ProgressService, SaveOutcome};
pub use stats_service::StatsService;
