//! Configuration loader utilities

use crate::{Config, ConfigBuilder, ConfigResult};
use std::path::{Path, PathBuf};

/// Environment prefix for overrides, e.g. `DIRMIRROR__SYNC__FAILURE_POLICY=continue`
pub const ENV_PREFIX: &str = "DIRMIRROR";

/// Configuration loader with common loading patterns
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from an explicit file, or from the default
    /// locations when none is given
    pub fn load(path: Option<&Path>) -> ConfigResult<Config> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load_default(),
        }
    }

    /// Load configuration from default locations
    pub fn load_default() -> ConfigResult<Config> {
        let mut builder = ConfigBuilder::new().add_defaults();

        if let Some(path) = Self::config_exists() {
            builder = builder.add_source_file(path);
        }

        builder.add_env_prefix(ENV_PREFIX).build()
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
        ConfigBuilder::new()
            .add_defaults()
            .add_source_file(path)
            .add_env_prefix(ENV_PREFIX)
            .build()
    }

    /// Get default configuration file paths in order of preference
    fn get_default_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("dirmirror.yaml"),
            PathBuf::from("dirmirror.yml"),
            PathBuf::from("dirmirror.toml"),
            PathBuf::from(".dirmirror.yaml"),
            PathBuf::from(".dirmirror.yml"),
            PathBuf::from(".dirmirror.toml"),
        ]
    }

    /// Check if a configuration file exists in default locations
    pub fn config_exists() -> Option<PathBuf> {
        Self::get_default_config_paths()
            .into_iter()
            .find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirmirror_types::FailurePolicy;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("dirmirror.yaml");
        std::fs::write(&config_path, "sync:\n  failure_policy: continue\n").unwrap();

        let config = ConfigLoader::load(Some(config_path.as_path())).unwrap();
        assert_eq!(config.sync.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_load_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("dirmirror.json");
        std::fs::write(&config_path, r#"{"logging": {"console": false}}"#).unwrap();

        let config = ConfigLoader::load_from_file(&config_path).unwrap();
        assert!(!config.logging.console);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigLoader::load(Some(temp_dir.path().join("absent.toml").as_path()));
        assert!(result.is_err());
    }
}
