//! Core configuration types and loading.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::blocks::{AssignmentBlock, PackBlock};
use super::defaults::{default_declined_message, default_failed_message, default_tick_millis};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "config_io",
            Self::Parse(_) => "config_parse",
        }
    }
}

/// Engine configuration.
///
/// ```toml
/// empty = "empty"
///
/// [engine]
/// debug = false
///
/// [packs.lobby]
/// url = "https://packs.example.net/lobby.zip"
/// hash = "0123456789abcdef0123456789abcdef01234567"
///
/// [global]
/// secondary = ["ui"]
///
/// [servers.lobby]
/// pack = "lobby"
/// send_delay = 20
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Name of the pack used to clear clients that cannot remove packs.
    pub empty: Option<String>,
    /// Engine behaviour.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Messages shown to clients.
    #[serde(default)]
    pub messages: MessagesConfig,
    /// Known packs by name.
    #[serde(default)]
    pub packs: BTreeMap<String, PackBlock>,
    /// Network-wide fallback assignment.
    #[serde(default)]
    pub global: AssignmentBlock,
    /// Per-server assignments.
    #[serde(default)]
    pub servers: BTreeMap<String, AssignmentBlock>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// The `[engine]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[serde(default)]
    pub debug: bool,
    /// Length of one tick in milliseconds (send delays are given in ticks).
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    /// Also disconnect clients whose download failed, not only refusals.
    #[serde(default)]
    pub kick_on_failure: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            tick_millis: default_tick_millis(),
            kick_on_failure: false,
        }
    }
}

impl EngineConfig {
    /// Wall-clock length of one tick. Zero falls back to the default.
    pub fn tick(&self) -> Duration {
        match self.tick_millis {
            0 => Duration::from_millis(default_tick_millis()),
            millis => Duration::from_millis(millis),
        }
    }
}

/// The `[messages]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesConfig {
    /// Disconnect reason when a client declines a pack.
    #[serde(default = "default_declined_message")]
    pub declined: String,
    /// Disconnect reason when a download fails and `kick_on_failure` is set.
    #[serde(default = "default_failed_message")]
    pub failed: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            declined: default_declined_message(),
            failed: default_failed_message(),
        }
    }
}
