//! # Configuration Loader
//!
//! Reads the TOML file into the [`AppConfig`] DTO and layers environment
//! variables on top. Values are taken as found; deciding what they mean is
//! left to [`super::wiring`].

use std::path::{Path, PathBuf};

use anyhow::Context;
use sn_core::config::AppConfig;

pub const ENV_BACKEND: &str = "SNAPPI_BACKEND";
pub const ENV_FIREBASE_API_KEY: &str = "SNAPPI_FIREBASE_API_KEY";
pub const ENV_FIREBASE_DATABASE_URL: &str = "SNAPPI_FIREBASE_DATABASE_URL";

/// `<config dir>/snappi/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("snappi").join("config.toml"))
}

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// Configuration for this process.
///
/// An explicit path must exist. The default path is optional: when it is
/// missing the process starts from an empty configuration. Environment
/// variables (after `.env` is loaded) override file values.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<AppConfig> {
    // A missing .env is the common case.
    let _ = dotenvy::dotenv();

    let config = match explicit {
        Some(path) => load_config(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => load_config(&path)?,
            _ => AppConfig::empty(),
        },
    };

    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

/// Overlay non-empty environment values onto `config`.
pub fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> AppConfig {
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(backend) = get(ENV_BACKEND) {
        config.backend = backend;
    }
    if let Some(api_key) = get(ENV_FIREBASE_API_KEY) {
        config.firebase_api_key = api_key;
    }
    if let Some(url) = get(ENV_FIREBASE_DATABASE_URL) {
        config.firebase_database_url = url;
    }
    config
}
