//! nostrcal configuration at ~/.config/nostrcal/config.toml

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_RECENT_LIMIT, DEFAULT_SEARCH_LIMIT, QUERY_TIMEOUT};
use crate::error::{CalResult, CalendarError};
use crate::relay::RelayProvider;

static DEFAULT_RELAY: &str = "nak";
static DEFAULT_LOG_LEVEL: &str = "warn";

fn default_relay() -> String {
    DEFAULT_RELAY.to_string()
}

fn default_query_timeout_secs() -> u64 {
    QUERY_TIMEOUT.as_secs()
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct NostrcalConfig {
    /// Relay provider name; the binary is `nostrcal-relay-<relay>`.
    #[serde(default = "default_relay")]
    pub relay: String,

    /// Passed through to the provider untouched (relay URLs, key source...).
    #[serde(default)]
    pub relay_params: HashMap<String, toml::Value>,

    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for NostrcalConfig {
    fn default() -> Self {
        NostrcalConfig {
            relay: default_relay(),
            relay_params: HashMap::new(),
            query_timeout_secs: default_query_timeout_secs(),
            recent_limit: DEFAULT_RECENT_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            search_limit: DEFAULT_SEARCH_LIMIT,
            log_level: default_log_level(),
        }
    }
}

impl NostrcalConfig {
    pub fn config_path() -> CalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalendarError::Config("Could not determine config directory".into()))?
            .join("nostrcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default path, creating a commented template on first
    /// run. `NOSTRCAL_*` environment variables override file values.
    pub fn load() -> CalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> CalResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("NOSTRCAL"))
            .build()
            .map_err(|e| CalendarError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalendarError::Config(e.to_string()))
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn relay_provider(&self) -> RelayProvider {
        RelayProvider::new(&self.relay, &self.relay_params)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalResult<()> {
        let contents = format!(
            "\
# nostrcal configuration

# Relay provider (binary nostrcal-relay-<name> on your PATH):
# relay = \"{DEFAULT_RELAY}\"

# Seconds before a relay query is abandoned:
# query_timeout_secs = {}

# recent_limit = {DEFAULT_RECENT_LIMIT}
# page_size = {DEFAULT_PAGE_SIZE}
# search_limit = {DEFAULT_SEARCH_LIMIT}
# log_level = \"{DEFAULT_LOG_LEVEL}\"

# Settings passed to the relay provider:
# [relay_params]
# relays = [\"wss://relay.damus.io\", \"wss://nos.lol\"]
",
            QUERY_TIMEOUT.as_secs(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalendarError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalendarError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
