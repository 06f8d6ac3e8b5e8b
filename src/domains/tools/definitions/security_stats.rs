//! Security statistics tool.
//!
//! Reports the counters of the security layer. Reading them does not count
//! as an operation.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::security::{SecurityManager, SecurityStatistics};

/// The statistics tool takes no parameters.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SecurityStatsParams {}

/// Security statistics tool - reports counters of the security layer.
pub struct SecurityStatsTool;

impl SecurityStatsTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "security_stats";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Report security layer statistics: total and rejected operations, flagged operations, protected directories and the current rate-limit status.";

    /// Execute the tool logic.
    #[instrument(skip_all)]
    pub fn execute(security: &SecurityManager) -> CallToolResult {
        let stats = security.statistics();
        debug!(total = stats.total_operations, "Security statistics requested");

        let summary = format!(
            "Security status: {} ({} operations, {} rejected, {} flagged, limit {})",
            stats.security_status,
            stats.total_operations,
            stats.rejected_operations,
            stats.flagged_operations,
            stats.operation_limit
        );

        CallToolResult {
            content: vec![Content::text(summary)],
            structured_content: serde_json::to_value(&stats).ok(),
            is_error: Some(false),
            meta: None,
        }
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<SecurityStatsParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<SecurityStatistics>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for the rmcp router.
    pub fn create_route<S>(security: Arc<SecurityManager>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |_ctx: ToolCallContext<'_, S>| {
            let security = security.clone();
            async move { Ok::<_, McpError>(Self::execute(&security)) }.boxed()
        })
    }
}
