//! MCP Server implementation.
//!
//! The handler only serves tools. Tools are defined in
//! `domains/tools/definitions/` and the router is built dynamically in
//! `domains/tools/router.rs`, so adding a tool does not touch this file.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;

use super::config::Config;
use super::security::{SecurityManager, SecurityStatistics};
use crate::domains::tools::{ToolError, ToolRegistry, build_tool_router};

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    config: Arc<Config>,

    /// Shared by every tool call for the lifetime of the process.
    security: Arc<SecurityManager>,

    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(config: Config, security: Arc<SecurityManager>) -> Self {
        Self {
            tool_router: build_tool_router::<Self>(security.clone()),
            config: Arc::new(config),
            security,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn statistics(&self) -> SecurityStatistics {
        self.security.statistics()
    }

    /// Names of the tools the router serves.
    pub fn list_tools(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect()
    }

    /// Call a tool by name outside of an MCP session.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, ToolError> {
        ToolRegistry::new(self.security.clone()).call_tool(name, arguments)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Code generation for loco-rs projects. Every request is validated and confined to the configured project root; use security_stats to inspect rejections."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
