// src/config.rs

use crate::connectors::messages::DEFAULT_STATS_WINDOW;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub stats_window: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            stats_window: DEFAULT_STATS_WINDOW.to_string(),
        }
    }
}

/// Which of two overlapping full refreshes gets to write the snapshot.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RefreshOrdering {
    /// The refresh that completes last wins, even if it was issued first.
    Completion,
    /// Only the most recently issued refresh may write; older ones are discarded.
    #[default]
    Issue,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub symbol: String,
    pub tick_rate_ms: u64,
    pub refresh_ordering: RefreshOrdering,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub directory: String,
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub dashboard: DashboardConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Defaults, then an optional `Settings` file, then `APP_*` environment variables
    /// (`__` separates sections, e.g. `APP_BACKEND__BASE_URL`).
    pub fn new() -> Result<Self, ConfigError> {
        Self::build(
            Config::builder()
                .add_source(File::with_name("Settings").required(false))
                .add_source(
                    Environment::with_prefix("APP")
                        .prefix_separator("_")
                        .separator("__"),
                ),
        )
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let backend = BackendConfig::default();
        let config = builder
            .set_default("backend.base_url", backend.base_url)?
            .set_default("backend.timeout_ms", backend.timeout_ms)?
            .set_default("backend.stats_window", backend.stats_window)?
            .set_default("dashboard.symbol", "")?
            .set_default("dashboard.tick_rate_ms", 250)?
            .set_default("dashboard.refresh_ordering", "issue")?
            .set_default("log.directory", "logs")?
            .set_default("log.level", "info")?
            .build()?;
        config.try_deserialize()
    }
}
