//! # fr-config
//!
//! Layered settings for the food rescue binary. Later sources win:
//! built-in defaults, an optional TOML file, `.env`, then process
//! environment variables such as `FOOD_RESCUE__STORAGE__DATA_DIR`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const ENV_PREFIX: &str = "FOOD_RESCUE";
pub const DEFAULT_CONFIG_FILE: &str = "food-rescue.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the state file.
    pub data_dir: PathBuf,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info` or `fr_core=debug`. `RUST_LOG` wins.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Settings {
    /// Loads `.env` into the process environment, then resolves settings
    /// from `file` (or [`DEFAULT_CONFIG_FILE`]) and the environment.
    /// A missing file is not an error.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_with(file, None)
    }

    /// Same as [`Settings::load`] without touching `.env`. `env` replaces the
    /// process environment when given.
    pub fn load_with(
        file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        debug!(path = %file.display(), "resolving configuration");

        let settings = Config::builder()
            .set_default("storage.data_dir", "./data")?
            .set_default("storage.file_name", "food-rescue-data.json")?
            .set_default("log.filter", "info")?
            .set_default("log.json", false)?
            .add_source(File::from(file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn state_file(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_with(Some(&dir.path().join("absent.toml")), no_env()).unwrap();
        assert_eq!(settings.storage.data_dir, PathBuf::from("./data"));
        assert_eq!(settings.storage.file_name, "food-rescue-data.json");
        assert_eq!(settings.log.filter, "info");
        assert!(!settings.log.json);
    }

    #[test]
    fn test_file_then_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("food-rescue.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"/var/lib/food-rescue\"\n\n[log]\nfilter = \"debug\"\n",
        )
        .unwrap();

        let from_file = Settings::load_with(Some(&path), no_env()).unwrap();
        assert_eq!(from_file.storage.data_dir, PathBuf::from("/var/lib/food-rescue"));
        assert_eq!(from_file.log.filter, "debug");

        let env = HashMap::from([
            ("FOOD_RESCUE__STORAGE__DATA_DIR".to_string(), "/tmp/fr".to_string()),
            ("FOOD_RESCUE__LOG__JSON".to_string(), "true".to_string()),
        ]);
        let overridden = Settings::load_with(Some(&path), Some(env)).unwrap();
        assert_eq!(overridden.storage.data_dir, PathBuf::from("/tmp/fr"));
        assert_eq!(overridden.log.filter, "debug");
        assert!(overridden.log.json);
        assert_eq!(overridden.state_file(), PathBuf::from("/tmp/fr/food-rescue-data.json"));
    }
}
