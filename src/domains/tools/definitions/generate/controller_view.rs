//! Controller and view generation tool.

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
use crate::domains::generation::plan::owned_strings;
use crate::domains::generation::{DEFAULT_ACTIONS, DEFAULT_VIEW_TYPES, GenerationPlan};

/// Parameters for the controller/view generation tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GenerateControllerViewParams {
    /// Name of an existing model.
    pub model_name: String,

    /// Controller actions. Defaults to index, show, create, update, delete.
    #[serde(default)]
    pub actions: Option<Vec<String>>,

    /// View templates. Defaults to list, show, form, edit.
    #[serde(default)]
    pub view_types: Option<Vec<String>>,

    /// Path to the project directory. Defaults to the configured root.
    #[serde(default)]
    pub project_path: Option<String>,
}

fn or_default(values: &Option<Vec<String>>, default: &[&str]) -> Vec<String> {
    values.clone().unwrap_or_else(|| owned_strings(default))
}

/// Controller/view generation tool - plans a controller and templates for an existing model.
pub struct GenerateControllerViewTool;

impl GenerateControllerViewTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "generate_controller_view";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Plan a controller and view templates for an existing model in a loco-rs project, and register its routes.";

    /// Execute the tool logic.
    #[instrument(skip_all, fields(model = %params.model_name))]
    pub fn execute(
        params: &GenerateControllerViewParams,
        security: &SecurityManager,
        context: &SecurityContext,
    ) -> CallToolResult {
        let actions = or_default(&params.actions, DEFAULT_ACTIONS);
        let view_types = or_default(&params.view_types, DEFAULT_VIEW_TYPES);
        info!(
            "Controller generation requested: actions [{}], views [{}]",
            actions.join(", "),
            view_types.join(", ")
        );

        let root = params
            .project_path
            .as_deref()
            .map(Path::new)
            .unwrap_or(context.allowed_root());
        let plan = GenerationPlan::controller_view(&params.model_name, root, &actions, &view_types);
        preflight_result(security, context, plan)
    }

    /// Admit raw arguments and run the tool.
    pub fn call(
        security: &SecurityManager,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let admitted = admit::<GenerateControllerViewParams>(
            security,
            Operation::GenerateControllerView,
            arguments,
        )?;
        Ok(Self::execute(&admitted.params, security, &admitted.context))
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<GenerateControllerViewParams>().into(),
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
