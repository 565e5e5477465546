//! Configuration management system for treesync
//!
//! Configuration is layered: built-in defaults, then an optional YAML, TOML
//! or JSON file, then environment variables prefixed with `TREESYNC`
//! (nested keys separated by `__`, e.g. `TREESYNC__SYNC__CONCURRENCY=8`).
//!
//! # Examples
//!
//! ```rust,no_run
//! use treesync_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("treesync.yaml")
//!     .add_env_prefix("TREESYNC")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Concurrency: {}", config.sync.concurrency.get());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use serde::{Deserialize, Serialize};
use std::time::Duration;
use treesync_types::{Concurrency, RetryPolicy};

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Main configuration structure for treesync
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Tree walk configuration
    #[serde(default)]
    pub sync: SyncConfig,
    /// Retry configuration for busy files
    #[serde(default)]
    pub retry: RetryConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tree walk configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Substrings; an entry whose name or relative path contains one is skipped
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Maximum number of simultaneous file operations
    #[serde(default)]
    pub concurrency: Concurrency,
}

/// Retry configuration for copies that hit a locked or busy file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per file, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Linear backoff unit in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl RetryConfig {
    /// Convert into the engine's retry policy
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    RetryPolicy::DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    RetryPolicy::DEFAULT_BASE_DELAY.as_millis() as u64
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatting
    #[serde(default)]
    pub json_format: bool,
    /// Enable colored output
    #[serde(default = "default_colored_output")]
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            colored_output: default_colored_output(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_colored_output() -> bool {
    true
}
