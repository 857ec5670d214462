//! Configuration management system for dirmirror
//!
//! The positional command-line arguments (source, destination, interval, log
//! directory) describe *what* to mirror. Everything about *how* to mirror it
//! lives here and can be layered from defaults, a YAML/TOML/JSON file and
//! `DIRMIRROR__*` environment variables.
//!
//! # Examples
//!
//! ```rust
//! use dirmirror_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_env_prefix("DIRMIRROR")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! assert_eq!(config.logging.file_name, "synchronization.log");
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use dirmirror_types::{BufferSize, FailurePolicy};
use serde::{Deserialize, Serialize};

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Log levels accepted in `logging.level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure for dirmirror
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Reconciliation and scheduling behaviour
    #[serde(default)]
    pub sync: SyncConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reconciliation and scheduling behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// What to do when a cycle fails
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Log and skip entries that fail instead of aborting the cycle
    #[serde(default)]
    pub isolate_entry_failures: bool,
    /// Read buffer used when fingerprinting files
    #[serde(default)]
    pub hash_buffer_size: BufferSize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Abort,
            isolate_entry_failures: false,
            hash_buffer_size: BufferSize::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_level")]
    pub level: String,
    /// Name of the log file created inside the log directory
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Mirror log lines to stdout
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_name: default_file_name(),
            console: default_console(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_file_name() -> String {
    "synchronization.log".to_string()
}

fn default_console() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.sync.failure_policy, FailurePolicy::Abort);
        assert!(!config.sync.isolate_entry_failures);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file_name, "synchronization.log");
        assert!(config.logging.console);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("sync:\n  failure_policy: continue\n").unwrap();

        assert_eq!(config.sync.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.sync.hash_buffer_size, BufferSize::default());
        assert_eq!(config.logging.file_name, "synchronization.log");
    }
}
