//! Tool Router - builds the rmcp ToolRouter.
//!
//! Each tool knows how to create its own route; this module only lists them.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{
    GenerateControllerViewTool, GenerateModelTool, GenerateScaffoldTool, SecurityStatsTool,
};
use crate::core::security::SecurityManager;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(security: Arc<SecurityManager>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(GenerateModelTool::create_route(security.clone()))
        .with_route(GenerateScaffoldTool::create_route(security.clone()))
        .with_route(GenerateControllerViewTool::create_route(security.clone()))
        .with_route(SecurityStatsTool::create_route(security))
}
