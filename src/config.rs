//! Queue Monitor Configuration
//!
//! Defaults, optionally overlaid by a TOML file, then by environment variables.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::queue::AnalyticsConfig;

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// HTTP listen address
    pub listen_addr: String,
    /// SQLite file holding the sample history
    pub database_path: String,
    /// Base URL of the CSM API
    pub csm_api_endpoint: String,
    /// Poll interval for the background refresher
    #[serde(with = "duration_secs")]
    pub refresh_interval: Duration,
    /// Timeout for one queue status request
    #[serde(with = "duration_secs")]
    pub fetch_timeout: Duration,
    pub analytics: AnalyticsConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8090".into(),
            database_path: "queue_history.db".into(),
            csm_api_endpoint: "http://localhost:9000".into(),
            refresh_interval: Duration::from_secs(300), // 5 minutes
            fetch_timeout: Duration::from_secs(10),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load from a TOML file (or defaults) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Invalid config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reject values the poller and HTTP client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval.is_zero() {
            bail!("refresh_interval must be at least 1 second");
        }
        if self.fetch_timeout.is_zero() {
            bail!("fetch_timeout must be at least 1 second");
        }
        Ok(())
    }

    /// Overlay values from `lookup` (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("QUEUE_LISTEN_ADDR") {
            self.listen_addr = v;
        }
        if let Some(v) = non_empty("QUEUE_DATA_PATH") {
            self.database_path = v;
        }
        if let Some(v) = non_empty("CSM_API_ENDPOINT") {
            self.csm_api_endpoint = v;
        }
        if let Some(secs) = non_empty("QUEUE_REFRESH_INTERVAL_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&v| v > 0)
        {
            self.refresh_interval = Duration::from_secs(secs);
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
