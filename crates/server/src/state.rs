use std::sync::Arc;
use std::time::Instant;

use services::{AppServices, ProgressService, StatsService};

#[derive(Clone)]
pub struct AppState {
    progress: Arc<ProgressService>,
    stats: Arc<StatsService>,
    started_at: Instant,
}

impl AppState {
    pub fn new(services: &AppServices) -> Self {
        Self {
            progress: services.progress(),
            stats: services.stats(),
            started_at: Instant::now(),
        }
    }

    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    pub fn stats(&self) -> &StatsService {
        &self.stats
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
