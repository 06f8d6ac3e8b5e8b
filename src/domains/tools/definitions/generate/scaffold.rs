//! Scaffold generation tool.

use chrono::Utc;
use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, JsonObject, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

use super::common::{GenerationResult, admit, preflight_result};
use crate::core::security::{Operation, SecurityContext, SecurityManager};
use crate::domains::generation::GenerationPlan;

/// Parameters for the scaffold generation tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateScaffoldParams {
    /// Model name in snake_case.
    pub model_name: String,

    /// Field definitions in `name:type[:constraint]*` form.
    pub fields: Vec<String>,

    /// Generate view templates. Defaults to `true`.
    #[serde(default)]
    pub include_views: Option<bool>,

    /// Generate a controller. Only `true` is supported.
    #[serde(default)]
    pub include_controllers: Option<bool>,

    /// API-only scaffolding without views.
    #[serde(default)]
    pub api_only: Option<bool>,

    /// Path to the project directory. Defaults to the configured root.
    #[serde(default)]
    pub project_path: Option<String>,
}

impl GenerateScaffoldParams {
    pub fn api_only(&self) -> bool {
        self.api_only.unwrap_or(false)
    }

    pub fn include_views(&self) -> bool {
        self.include_views.unwrap_or(true)
    }
}

/// Scaffold generation tool - plans model, controller, views and routes together.
pub struct GenerateScaffoldTool;

impl GenerateScaffoldTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "generate_scaffold";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Plan a full CRUD scaffold (model, migration, controller, views and routes) in a loco-rs project. Set api_only=true with include_views=false to skip views.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(model = %params.model_name, api_only = params.api_only()))]
    pub fn execute(
        params: &GenerateScaffoldParams,
        security: &SecurityManager,
        context: &SecurityContext,
    ) -> CallToolResult {
        info!(
            "Scaffold generation requested (views: {})",
            params.include_views()
        );

        let root = params
            .project_path
            .as_deref()
            .map(Path::new)
            .unwrap_or(context.allowed_root());
        let plan = GenerationPlan::scaffold(
            &params.model_name,
            &params.fields,
            root,
            Utc::now(),
            params.include_views(),
        );
        preflight_result(security, context, plan)
    }

    /// Admit raw arguments and run the tool.
    pub fn call(
        security: &SecurityManager,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let admitted =
            admit::<GenerateScaffoldParams>(security, Operation::GenerateScaffold, arguments)?;
        Ok(Self::execute(&admitted.params, security, &admitted.context))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<GenerateScaffoldParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<GenerationResult>().into()),
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
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone();
            let security = security.clone();
            async move { Self::call(&security, args) }.boxed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SecurityConfig;
    use crate::core::security::SecurityStats;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/routes")).unwrap();
        fs::write(dir.path().join("src/routes/mod.rs"), "").unwrap();
        dir
    }

    fn call(dir: &TempDir, value: serde_json::Value) -> Result<CallToolResult, McpError> {
        let security =
            SecurityManager::new(SecurityConfig::new(dir.path()), Arc::new(SecurityStats::new()));
        GenerateScaffoldTool::call(&security, value.as_object().cloned())
    }

    fn planned_paths(result: &CallToolResult) -> Vec<String> {
        result.structured_content.as_ref().unwrap()["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["relative_path"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_full_scaffold() {
        let dir = project();
        let result = call(&dir, json!({"model_name": "post", "fields": ["title:string"]})).unwrap();

        let paths = planned_paths(&result);
        assert_eq!(paths.len(), 8);
        assert!(paths.contains(&"src/views/post/form.html.tera".to_string()));

        let report = &result.structured_content.unwrap()["report"];
        assert_eq!(report["modified"][0], "src/routes/mod.rs");
        assert!(report["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_api_only_skips_views() {
        let dir = project();
        let result = call(
            &dir,
            json!({
                "model_name": "post",
                "fields": ["title:string"],
                "api_only": true,
                "include_views": false
            }),
        )
        .unwrap();
        assert!(planned_paths(&result).iter().all(|p| !p.starts_with("src/views/")));
    }

    #[test]
    fn test_api_only_with_views_is_rejected() {
        let dir = project();
        let err = call(
            &dir,
            json!({
                "model_name": "post",
                "fields": ["title:string"],
                "api_only": true,
                "include_views": true
            }),
        )
        .unwrap_err();
        assert!(err.message.contains("api_only=true and include_views=true"));
    }

    #[test]
    fn test_disabled_controllers_are_rejected() {
        let dir = project();
        let err = call(
            &dir,
            json!({"model_name": "post", "fields": ["title:string"], "include_controllers": false}),
        )
        .unwrap_err();
        assert_eq!(err.data.unwrap()["details"]["include_controllers"], false);
    }

    #[test]
    fn test_api_only_alone_is_rejected() {
        let dir = project();
        let err = call(
            &dir,
            json!({"model_name": "post", "fields": ["title:string"], "api_only": true}),
        )
        .unwrap_err();
        assert!(err.message.contains("api_only=true and include_views=true"));
    }

    #[test]
    fn test_views_default_on() {
        let params: GenerateScaffoldParams =
            serde_json::from_value(json!({"model_name": "post", "fields": [], "api_only": true}))
                .unwrap();
        assert!(params.include_views());
    }
}
