//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, EngineConfig, MessagesConfig)
//! - [`blocks`]: Pack and assignment blocks (PackBlock, AssignmentBlock)
//! - [`defaults`]: serde default value functions
//! - [`validation`]: Non-fatal checks run before a catalog is built

mod blocks;
mod defaults;
mod types;
pub mod validation;

pub use blocks::{AssignmentBlock, PackBlock};
pub use types::{Config, ConfigError, EngineConfig, MessagesConfig};
pub use validation::{ConfigWarning, validate};
