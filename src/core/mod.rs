//! Core module containing shared infrastructure components.
//!
//! Configuration, the crate-wide error type, the security layer, the MCP
//! server handler and the stdio transport.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
pub use security::{SecurityError, SecurityManager, SecurityStats};
pub use server::McpServer;
pub use transport::StdioTransport;
