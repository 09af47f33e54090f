//! Application settings, layered as defaults, then an optional TOML file,
//! then `TOY_STORE_` environment variables.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".toy-store";
/// Fallback when no home directory can be located.
const FALLBACK_DATA_DIR: &str = "data";
const DB_FILE_NAME: &str = "toys.sqlite";
const LOG_FILE_NAME: &str = "toy-store.log";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TOY_STORE_CONFIG";
/// Prefix for per-setting environment overrides.
pub const ENV_PREFIX: &str = "TOY_STORE_";

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to load or merge configuration.
    #[error("configuration error: {0}")]
    Load(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the toy table lives. See `DatabaseLocation::parse` for the
    /// accepted forms.
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }
}

/// `~/.toy-store`, or `./data` when the home directory is unknown.
pub fn data_dir() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

/// Config file to read: `$TOY_STORE_CONFIG` if set, else `~/.toy-store/config.toml`.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir().join(CONFIG_FILE_NAME))
}

fn default_database_url() -> String {
    data_dir().join(DB_FILE_NAME).display().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    data_dir().join(LOG_FILE_NAME)
}

impl AppConfig {
    /// Defaults plus the given config file, without environment overrides.
    /// A missing file contributes nothing.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        figment
    }

    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))
    }
}

/// Load configuration by merging layers:
/// 1. Default values
/// 2. Config file (if it exists)
/// 3. Environment variables (`TOY_STORE_` prefix)
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let figment = AppConfig::figment(config_path).merge(Env::prefixed(ENV_PREFIX));
    AppConfig::from_figment(&figment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_live_in_the_data_dir() {
        let config = AppConfig::default();
        assert!(config.database_url.ends_with(DB_FILE_NAME));
        assert!(config.log_file.ends_with(LOG_FILE_NAME));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let figment = AppConfig::figment(Some(Path::new("/nonexistent/toy-store.toml")));
        let config = AppConfig::from_figment(&figment).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn toml_overrides_defaults() {
        let figment = AppConfig::figment(None).merge(Toml::string(
            r#"
            database_url = "sqlite::memory:"
            log_level = "debug"
            "#,
        ));
        let config = AppConfig::from_figment(&figment).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_file, AppConfig::default().log_file);
    }

    #[test]
    fn reads_a_config_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database_url = \"/srv/toys.sqlite\"\n").unwrap();

        let config = AppConfig::from_figment(&AppConfig::figment(Some(path.as_path()))).unwrap();
        assert_eq!(config.database_url, "/srv/toys.sqlite");
    }

    #[test]
    fn environment_beats_file_and_file_beats_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                database_url = "/from/file.sqlite"
                log_level = "warn"
                "#,
            )?;
            jail.set_env("TOY_STORE_DATABASE_URL", "sqlite::memory:");

            let config = load_config(Some(Path::new("config.toml")))
                .map_err(|err| err.to_string())?;
            assert_eq!(config.database_url, "sqlite::memory:");
            assert_eq!(config.log_level, "warn");
            assert_eq!(config.log_file, AppConfig::default().log_file);
            Ok(())
        });
    }

    #[test]
    fn environment_applies_without_a_config_file() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("TOY_STORE_LOG_LEVEL", "trace");
            jail.set_env("TOY_STORE_LOG_FILE", "logs/toys.log");

            let config = load_config(Some(Path::new("missing.toml")))
                .map_err(|err| err.to_string())?;
            assert_eq!(config.log_level, "trace");
            assert_eq!(config.log_file, PathBuf::from("logs/toys.log"));
            assert_eq!(config.database_url, AppConfig::default().database_url);
            Ok(())
        });
    }

    #[test]
    fn malformed_values_are_reported() {
        let figment = AppConfig::figment(None).merge(Toml::string("log_level = [1, 2]"));
        let err = AppConfig::from_figment(&figment).unwrap_err();
        assert!(err.to_string().starts_with("configuration error"));
    }
}
