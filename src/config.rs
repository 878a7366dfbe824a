//! Application configuration.
//!
//! Everything the kernel needs besides code: log settings, the route table,
//! bus registrations and event listeners. Loaded from JSON.
//!
//! ```json
//! {
//!   "log": { "level": "debug" },
//!   "routes": [
//!     { "method": "GET", "path": "/users/{id}", "handler": "show-user", "middleware": ["log"] }
//!   ],
//!   "queries": [
//!     { "dto": "users.show", "handler": "users.show_handler", "aliases": ["show-user"] }
//!   ],
//!   "listeners": [
//!     { "event": "core.routeNotFound", "listener": "session.redirect" }
//!   ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::RouteDefinition;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log: LogConfig,
    pub routes: Vec<RouteDefinition>,
    pub commands: Vec<HandlerRegistration>,
    pub queries: Vec<HandlerRegistration>,
    pub listeners: Vec<ListenerRegistration>,
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// DTO type → handler id binding for one bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerRegistration {
    pub dto: String,
    pub handler: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerRegistration {
    pub event: String,
    pub listener: String,
}

/// Log output settings. `RUST_LOG` overrides `level` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `modulith=debug,warn`.
    pub level: String,
    pub format: LogFormat,
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            with_target: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}
