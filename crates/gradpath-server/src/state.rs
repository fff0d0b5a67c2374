//! Shared application state.

use gradpath_core::GradPathConfig;
use gradpath_precompute::PrecomputeOrchestrator;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: GradPathConfig,
    pub orchestrator: PrecomputeOrchestrator,
}

impl AppState {
    pub fn new(config: GradPathConfig, orchestrator: PrecomputeOrchestrator) -> Self {
        Self {
            config,
            orchestrator,
        }
    }
}
