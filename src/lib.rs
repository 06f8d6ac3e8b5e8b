//! Loco MCP Server Library
//!
//! An MCP server that plans code generation (models, scaffolds, controllers
//! and views) for loco-rs projects, behind a security layer that confines
//! every request to one project directory.
//!
//! # Architecture
//!
//! - **core**: configuration, errors, the security layer, the MCP handler
//!   and the stdio transport
//! - **domains**: business logic
//!   - **tools**: the MCP tools clients call
//!   - **generation**: generation plans and the guarded file writer
//!
//! # Example
//!
//! ```rust,no_run
//! use loco_mcp_server::core::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     loco_mcp_server::run(config).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

use std::sync::Arc;

use tracing::info;

// Re-export commonly used types for convenience
pub use crate::core::{Config, Error, McpServer, Result};

use crate::core::{SecurityManager, SecurityStats, StdioTransport};

/// Build the server for `config`.
///
/// The security statistics are created here, once per process, and shared
/// by every tool call.
pub fn build_server(config: Config) -> Result<McpServer> {
    let root = &config.security.project_root;
    if !root.is_dir() {
        return Err(Error::config(format!(
            "project root {} is not a directory",
            root.display()
        )));
    }

    let stats = Arc::new(SecurityStats::new());
    let security = Arc::new(SecurityManager::new(config.security.clone(), stats));
    info!(
        "Security layer ready: root {:?}, limit {} operations",
        root, config.security.max_operations
    );

    Ok(McpServer::new(config, security))
}

/// Build the server and serve it over stdio until the client disconnects.
pub async fn run(config: Config) -> Result<()> {
    let server = build_server(config)?;
    StdioTransport::run(server).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SecurityConfig;
    use tempfile::TempDir;

    #[test]
    fn test_build_server_requires_existing_root() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            security: SecurityConfig::new(dir.path().join("missing")),
            ..Config::default()
        };
        let err = build_server(config).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_build_server_starts_with_clean_stats() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            security: SecurityConfig::new(dir.path()),
            ..Config::default()
        };
        let server = build_server(config).unwrap();
        assert_eq!(server.statistics().total_operations, 0);
        assert_eq!(server.statistics().security_status, "healthy");
    }
}
