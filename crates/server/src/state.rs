use radar_core::Config;

use crate::analysis::Orchestrator;

/// Shared across all handlers behind an `Arc`.
pub struct AppState {
    pub config: Config,
    pub orchestrator: Orchestrator,
}
