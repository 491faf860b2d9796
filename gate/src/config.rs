//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use votegate_types::AccountId;

use crate::GateError;

/// Configuration for the votegate service.
///
/// Can be loaded from a TOML file via [`GateConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). Per-community vote settings are not
/// part of this file; they live in the settings store at `communities_path`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// TOML file holding per-community vote settings.
    #[serde(default = "default_communities_path")]
    pub communities_path: PathBuf,

    /// Account the service acts as; its own reactions are ignored.
    #[serde(default = "default_bot_account")]
    pub bot_account: AccountId,

    /// Upper bound on events handled concurrently. 1 handles events strictly
    /// in arrival order.
    #[serde(default = "default_max_concurrent_events")]
    pub max_concurrent_events: usize,

    /// Capacity of the inbound event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_communities_path() -> PathBuf {
    PathBuf::from("./communities.toml")
}

fn default_bot_account() -> AccountId {
    AccountId::new(0)
}

fn default_max_concurrent_events() -> usize {
    64
}

fn default_event_buffer() -> usize {
    1024
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GateConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, GateError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GateError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, GateError> {
        let config: Self = toml::from_str(s).map_err(|e| GateError::Config(e.to_string()))?;
        if config.max_concurrent_events == 0 {
            return Err(GateError::Config(
                "max_concurrent_events must be at least 1".into(),
            ));
        }
        if config.event_buffer == 0 {
            return Err(GateError::Config("event_buffer must be at least 1".into()));
        }
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, GateError> {
        toml::to_string_pretty(self).map_err(|e| GateError::Config(e.to_string()))
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            communities_path: default_communities_path(),
            bot_account: default_bot_account(),
            max_concurrent_events: default_max_concurrent_events(),
            event_buffer: default_event_buffer(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
