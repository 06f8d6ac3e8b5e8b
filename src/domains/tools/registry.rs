//! Tool Registry - central registration and dispatch for all tools.
//!
//! The rmcp router serves MCP clients; the registry serves everything else
//! (tests, embedding callers) through the same tool code.

use std::sync::Arc;
use tracing::warn;

use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

use super::definitions::{
    GenerateControllerViewTool, GenerateModelTool, GenerateScaffoldTool, SecurityStatsTool,
};
use super::error::ToolError;
use crate::core::security::SecurityManager;

pub struct ToolRegistry {
    security: Arc<SecurityManager>,
}

impl ToolRegistry {
    pub fn new(security: Arc<SecurityManager>) -> Self {
        Self { security }
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            GenerateModelTool::NAME,
            GenerateScaffoldTool::NAME,
            GenerateControllerViewTool::NAME,
            SecurityStatsTool::NAME,
        ]
    }

    /// Metadata of every tool, in registration order.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            GenerateModelTool::to_tool(),
            GenerateScaffoldTool::to_tool(),
            GenerateControllerViewTool::to_tool(),
            SecurityStatsTool::to_tool(),
        ]
    }

    /// Dispatch a call by tool name. `arguments` must be an object or null.
    pub fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, ToolError> {
        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(ToolError::invalid_arguments(format!(
                    "expected an object, got {}",
                    other
                )));
            }
        };

        let security = &self.security;
        let result = match name {
            GenerateModelTool::NAME => GenerateModelTool::call(security, arguments)?,
            GenerateScaffoldTool::NAME => GenerateScaffoldTool::call(security, arguments)?,
            GenerateControllerViewTool::NAME => {
                GenerateControllerViewTool::call(security, arguments)?
            }
            SecurityStatsTool::NAME => SecurityStatsTool::execute(security),
            _ => {
                warn!("Unknown tool requested: {}", name);
                return Err(ToolError::not_found(name));
            }
        };
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SecurityConfig;
    use crate::core::security::SecurityStats;
    use serde_json::json;
    use tempfile::TempDir;

    fn registry(dir: &TempDir) -> ToolRegistry {
        ToolRegistry::new(Arc::new(SecurityManager::new(
            SecurityConfig::new(dir.path()),
            Arc::new(SecurityStats::new()),
        )))
    }

    #[test]
    fn test_registry_tool_names() {
        let dir = TempDir::new().unwrap();
        let names = registry(&dir).tool_names();
        assert_eq!(
            names,
            vec![
                "generate_model",
                "generate_scaffold",
                "generate_controller_view",
                "security_stats"
            ]
        );
        assert_eq!(ToolRegistry::get_all_tools().len(), names.len());
    }

    #[test]
    fn test_registry_call_model() {
        let dir = TempDir::new().unwrap();
        let result = registry(&dir)
            .call_tool(
                "generate_model",
                json!({"model_name": "post", "fields": ["title:string"]}),
            )
            .unwrap();
        assert_eq!(result.is_error, Some(false));
    }

    #[test]
    fn test_registry_call_unknown() {
        let dir = TempDir::new().unwrap();
        let err = registry(&dir).call_tool("unknown", json!({})).unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn test_registry_rejects_non_object_arguments() {
        let dir = TempDir::new().unwrap();
        let err = registry(&dir)
            .call_tool("generate_model", json!(["post"]))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_rejection_keeps_payload() {
        let dir = TempDir::new().unwrap();
        let err = registry(&dir)
            .call_tool("generate_model", json!({"model_name": "post", "fields": ["id:i32"]}))
            .unwrap_err();
        assert_eq!(err.data().unwrap()["kind"], "ValidationError");
    }
}
