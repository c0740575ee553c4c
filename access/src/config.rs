//! Access Configuration
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Result};

/// Access configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON dependency graph overriding the catalog's own (optional)
    pub permission_graph_path: Option<PathBuf>,

    /// JSON permission catalog (optional, built-in warehouse catalog otherwise)
    pub permission_catalog_path: Option<PathBuf>,

    /// Reject invalid catalogs and graphs instead of warning (default: true)
    pub strict_graph: bool,

    /// Logging settings
    pub observability: ObservabilityConfig,
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset
    pub log_level: String,

    /// Output format
    pub log_format: LogFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "pretty" => Ok(Self::Text),
            other => bail!("LOG_FORMAT must be 'json' or 'text', got '{other}'"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let log_format = match env::var("LOG_FORMAT") {
            Ok(value) => value.parse()?,
            Err(_) => LogFormat::default(),
        };

        Ok(Self {
            permission_graph_path: env::var("PERMISSION_GRAPH_PATH").ok().map(PathBuf::from),
            permission_catalog_path: env::var("PERMISSION_CATALOG_PATH")
                .ok()
                .map(PathBuf::from),
            strict_graph: env::var("PERMISSION_GRAPH_STRICT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            observability: ObservabilityConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "wms_access=info".into()),
                log_format,
            },
        })
    }

    /// Create a default configuration for testing.
    ///
    /// Uses the built-in catalog in strict mode.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            permission_graph_path: None,
            permission_catalog_path: None,
            strict_graph: true,
            observability: ObservabilityConfig {
                log_level: "wms_access=debug".into(),
                log_format: LogFormat::Text,
            },
        }
    }
}
