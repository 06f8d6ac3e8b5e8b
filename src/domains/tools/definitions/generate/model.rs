//! Model generation tool.
//!
//! Plans a model file and its migration for a loco-rs project.

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

/// Parameters for the model generation tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateModelParams {
    /// Model name in snake_case (e.g. "blog_post").
    pub model_name: String,

    /// Field definitions in `name:type[:constraint]*` form
    /// (e.g. "title:string", "email:string:unique").
    pub fields: Vec<String>,

    /// Path to the project directory. Defaults to the configured root.
    #[serde(default)]
    pub project_path: Option<String>,
}

/// Model generation tool - plans a model file and its migration.
pub struct GenerateModelTool;

impl GenerateModelTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "generate_model";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Plan a new model and its database migration in a loco-rs project. Every target file is checked against the project sandbox before anything is written.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(model = %params.model_name))]
    pub fn execute(
        params: &GenerateModelParams,
        security: &SecurityManager,
        context: &SecurityContext,
    ) -> CallToolResult {
        info!("Model generation requested with {} field(s)", params.fields.len());

        let root = params
            .project_path
            .as_deref()
            .map(Path::new)
            .unwrap_or(context.allowed_root());
        let plan = GenerationPlan::model(&params.model_name, &params.fields, root, Utc::now());
        preflight_result(security, context, plan)
    }

    /// Admit raw arguments and run the tool.
    pub fn call(
        security: &SecurityManager,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let admitted = admit::<GenerateModelParams>(security, Operation::GenerateModel, arguments)?;
        Ok(Self::execute(&admitted.params, security, &admitted.context))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<GenerateModelParams>().into(),
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
