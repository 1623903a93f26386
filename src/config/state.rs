// Application state module

use super::types::Config;

/// Application state shared across request handlers
///
/// Handlers receive this as `Arc<AppState>` so tests can run against a
/// throwaway configuration instead of a process-wide constant.
pub struct AppState {
    pub config: Config,
}

impl AppState {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}
