//! # Configuration DTO
//!
//! Pure data: TOML → [`AppConfig`] mapping only. Interpretation of the
//! values (which backend to build, whether file logging is on) belongs to the
//! bootstrap layer.

use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Tree store backend name (`memory`, `firebase`); may be empty.
    pub backend: String,

    /// Web API key used for anonymous sign-in.
    pub firebase_api_key: String,

    /// Realtime Database URL, e.g. `https://<project>.firebaseio.com`.
    pub firebase_database_url: String,

    /// Directory for the log file; empty disables file logging.
    pub log_directory: PathBuf,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// Missing keys become empty values; they are facts, not errors.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let str_at = |section: &str, key: &str| {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };

        Ok(Self {
            backend: str_at("backend", "kind"),
            firebase_api_key: str_at("firebase", "api_key"),
            firebase_database_url: str_at("firebase", "database_url"),
            log_directory: PathBuf::from(str_at("logging", "directory")),
        })
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self {
            backend: String::new(),
            firebase_api_key: String::new(),
            firebase_database_url: String::new(),
            log_directory: PathBuf::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_toml_maps_every_section() {
        let value: toml::Value = toml::from_str(
            r#"
            [backend]
            kind = "firebase"

            [firebase]
            api_key = "key"
            database_url = "https://demo.firebaseio.com"

            [logging]
            directory = "/var/log/snappi"
            "#,
        )
        .unwrap();

        let config = AppConfig::from_toml(&value).unwrap();
        assert_eq!(config.backend, "firebase");
        assert_eq!(config.firebase_api_key, "key");
        assert_eq!(config.firebase_database_url, "https://demo.firebaseio.com");
        assert_eq!(config.log_directory, PathBuf::from("/var/log/snappi"));
    }

    #[test]
    fn missing_sections_are_empty_facts() {
        let value: toml::Value = toml::from_str("").unwrap();
        assert_eq!(AppConfig::from_toml(&value).unwrap(), AppConfig::empty());
    }
}
