// ⚙️ Configuration - defaults, JSON file, environment overrides
//
// Resolution order: built-in defaults → file named by FRAUD_CONFIG →
// FRAUD_SNAPSHOT / FRAUD_TICK_MS / FRAUD_SERVER_ADDR.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const CONFIG_ENV: &str = "FRAUD_CONFIG";
pub const SNAPSHOT_ENV: &str = "FRAUD_SNAPSHOT";
pub const TICK_ENV: &str = "FRAUD_TICK_MS";
pub const SERVER_ADDR_ENV: &str = "FRAUD_SERVER_ADDR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON snapshot to load; `None` uses the built-in sample data
    pub snapshot_path: Option<PathBuf>,

    /// Playback tick period of the terminal UI
    pub tick_ms: u64,

    pub server_addr: String,

    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,

    /// Anchor for the report date-range filter
    pub reference_date: Option<NaiveDate>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            snapshot_path: None,
            tick_ms: 800,
            server_addr: "0.0.0.0:3000".to_string(),
            log_level: "info".to_string(),
            reference_date: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Full resolution: defaults, optional config file, environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Config::from_file(PathBuf::from(path))?,
            None => Config::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in practice)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(SNAPSHOT_ENV) {
            self.snapshot_path = Some(PathBuf::from(path));
        }
        if let Some(tick) = lookup(TICK_ENV) {
            self.tick_ms = tick
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of milliseconds, got {:?}", TICK_ENV, tick))?;
        }
        if let Some(addr) = lookup(SERVER_ADDR_ENV) {
            self.server_addr = addr;
        }
        Ok(())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Install the fmt subscriber. RUST_LOG wins over the configured level.
/// Logs go to stderr so they stay out of the terminal UI and of piped JSON.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.snapshot_path, None);
        assert_eq!(config.tick_ms, 800);
        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.tick_rate(), Duration::from_millis(800));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"tick_ms": 250, "reference_date": "2024-01-20"}"#).unwrap();
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2024, 1, 20));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (SNAPSHOT_ENV, "/tmp/snapshot.json"),
            (TICK_ENV, " 120 "),
            (SERVER_ADDR_ENV, "127.0.0.1:8080"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.snapshot_path, Some(PathBuf::from("/tmp/snapshot.json")));
        assert_eq!(config.tick_ms, 120);
        assert_eq!(config.server_addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_bad_tick_override_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| (key == TICK_ENV).then(|| "fast".to_string()));
        assert!(result.is_err());
        assert_eq!(config.tick_ms, 800);
    }

    #[test]
    fn test_zero_tick_is_floored() {
        let config = Config {
            tick_ms: 0,
            ..Config::default()
        };
        assert_eq!(config.tick_rate(), Duration::from_millis(1));
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::from_file("/nonexistent/fraud-config.json");
        assert!(result.is_err());
    }
}
