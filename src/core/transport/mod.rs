//! Transport layer for the MCP server.
//!
//! The server speaks MCP over standard input/output only. Logs go to
//! stderr so they never interleave with protocol traffic.

mod error;
pub mod stdio;

pub use error::{TransportError, TransportResult};
pub use stdio::StdioTransport;
