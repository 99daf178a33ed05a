// crates/server/src/state.rs
//! Application state for the Axum server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use logpack_core::JobRegistry;

/// Sentinel forwarded to the collector meaning "no history limit".
pub const DEFAULT_HISTORY_LENGTH: i64 = -1;

/// Runtime configuration, built from the CLI in `main`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the collector writes archives into and `ServeDir` reads from.
    pub logs_dir: PathBuf,
    /// Collector executable, resolved via `PATH` unless given as a path.
    pub collector: String,
    /// Retention window forwarded opaquely to the collector.
    pub history_length: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("/logs"),
            collector: "logs-collector.sh".to_string(),
            history_length: DEFAULT_HISTORY_LENGTH,
        }
    }
}

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    pub config: Config,
    /// The authoritative in-memory job registry.
    pub registry: JobRegistry,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            start_time: Instant::now(),
            config,
            registry: JobRegistry::new(),
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logs_dir, PathBuf::from("/logs"));
        assert_eq!(config.collector, "logs-collector.sh");
        assert_eq!(config.history_length, DEFAULT_HISTORY_LENGTH);
    }

    #[test]
    fn test_app_state_new() {
        let state = AppState::new(Config::default());
        assert!(state.registry.is_empty());
        assert!(state.uptime_secs() < 1);
    }
}
