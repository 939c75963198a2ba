//! # Dependency Injection
//!
//! Builds concrete adapters from [`AppConfig`] and injects them into
//! [`App`]. This is the only module that depends on `sn-infra` and `sn-app`
//! at the same time; it assembles, it does not decide.

use std::sync::Arc;

use sn_app::{App, AppDeps};
use sn_core::config::AppConfig;
use sn_core::Uid;
use sn_infra::{
    FirebaseAnonymousAuth, FirebaseTreeStore, InMemoryTreeStore, LocalAnonymousIdentity,
    SystemClock, TokioFileReader,
};
use tracing::info;

/// Errors during dependency injection
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("unknown backend {0:?}; expected \"memory\" or \"firebase\"")]
    UnknownBackend(String),

    #[error("firebase backend needs {0}")]
    MissingSetting(&'static str),

    #[error("HTTP client initialization failed: {0}")]
    HttpClient(String),

    #[error("tree store initialization failed: {0}")]
    Store(String),
}

/// Tree store backend selected by configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Process-local tree. Every principal in this process shares it.
    Memory,
    Firebase {
        api_key: String,
        database_url: String,
    },
}

impl Backend {
    /// An empty backend name means `memory`.
    pub fn from_config(config: &AppConfig) -> Result<Self, WiringError> {
        match config.backend.trim() {
            "" | "memory" => Ok(Backend::Memory),
            "firebase" => {
                if config.firebase_api_key.trim().is_empty() {
                    return Err(WiringError::MissingSetting("firebase.api_key"));
                }
                if config.firebase_database_url.trim().is_empty() {
                    return Err(WiringError::MissingSetting("firebase.database_url"));
                }
                Ok(Backend::Firebase {
                    api_key: config.firebase_api_key.trim().to_string(),
                    database_url: config.firebase_database_url.trim().to_string(),
                })
            }
            other => Err(WiringError::UnknownBackend(other.to_string())),
        }
    }
}

/// Wire one principal against the configured backend.
pub fn wire_app(backend: &Backend) -> Result<App, WiringError> {
    match backend {
        Backend::Memory => Ok(wire_memory_principal(
            &InMemoryTreeStore::new(),
            LocalAnonymousIdentity::new(),
        )),
        Backend::Firebase {
            api_key,
            database_url,
        } => {
            let client = reqwest::Client::builder()
                .build()
                .map_err(|e| WiringError::HttpClient(e.to_string()))?;
            let auth = Arc::new(FirebaseAnonymousAuth::new(client.clone(), api_key.clone()));
            let store = FirebaseTreeStore::new(client, database_url, auth.clone())
                .map_err(|e| WiringError::Store(format!("{e:#}")))?;

            info!(database_url = %database_url, "wired firebase backend");
            Ok(App::new(AppDeps {
                store: Arc::new(store),
                identity: auth,
                clock: Arc::new(SystemClock),
                files: Arc::new(TokioFileReader),
            }))
        }
    }
}

/// Wire a principal onto an existing in-memory tree, so several principals
/// can share one process.
pub fn wire_memory_principal(store: &InMemoryTreeStore, identity: LocalAnonymousIdentity) -> App {
    App::new(AppDeps {
        store: Arc::new(store.clone()),
        identity: Arc::new(identity),
        clock: Arc::new(SystemClock),
        files: Arc::new(TokioFileReader),
    })
}

/// Named principal for scripted runs.
pub fn named_principal(store: &InMemoryTreeStore, uid: &str) -> App {
    wire_memory_principal(store, LocalAnonymousIdentity::with_uid(Uid::from(uid)))
}
