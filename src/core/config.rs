//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables, a `.env` file, or defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Default ceiling on validated operations per process lifetime.
pub const DEFAULT_MAX_OPERATIONS: u64 = 1000;

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Sandbox and rate-limit configuration.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for the security layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Directory every generated file must resolve beneath.
    pub project_root: PathBuf,

    /// Base directory for relative project paths.
    /// Falls back to `project_root` when unset.
    pub working_dir: Option<PathBuf>,

    /// Validated operations allowed per process lifetime.
    pub max_operations: u64,
}

impl SecurityConfig {
    /// Security configuration rooted at `project_root` with default limits.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            working_dir: None,
            max_operations: DEFAULT_MAX_OPERATIONS,
        }
    }

    /// The directory relative project paths are resolved against.
    pub fn effective_working_dir(&self) -> &PathBuf {
        self.working_dir.as_ref().unwrap_or(&self.project_root)
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "loco-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_PROJECT_ROOT`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(root) = std::env::var("MCP_PROJECT_ROOT") {
            config.security.project_root = PathBuf::from(root);
            info!("Project root set to {:?}", config.security.project_root);
        } else {
            warn!(
                "MCP_PROJECT_ROOT not set - generation is confined to the current directory {:?}",
                config.security.project_root
            );
        }

        if let Ok(dir) = std::env::var("MCP_WORKING_DIR") {
            config.security.working_dir = Some(PathBuf::from(dir));
        }

        if let Ok(limit) = std::env::var("MCP_MAX_OPERATIONS") {
            match limit.parse() {
                Ok(limit) => config.security.max_operations = limit,
                Err(_) => warn!(
                    "Ignoring invalid MCP_MAX_OPERATIONS '{}', using {}",
                    limit, config.security.max_operations
                ),
            }
        }

        config
    }
}
