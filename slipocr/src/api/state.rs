use std::sync::Arc;

use crate::config::Config;
use crate::jobs::JobOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub orchestrator: JobOrchestrator,
}

impl AppState {
    pub fn new(config: Config, orchestrator: JobOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            orchestrator,
        }
    }
}
