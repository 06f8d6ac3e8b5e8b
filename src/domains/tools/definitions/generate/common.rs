//! Admission and result formatting shared by the generation tools.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content, JsonObject},
};
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::core::security::{Operation, SecurityContext, SecurityError, SecurityManager};
use crate::domains::generation::{GenerationPlan, GenerationReport, GuardedWriter, PlannedFile};

/// Convert a rejection into an MCP `invalid_params` error carrying the
/// structured payload as `data`.
pub fn security_error(error: &SecurityError) -> McpError {
    let data = serde_json::to_value(error.to_payload()).ok();
    McpError::invalid_params(error.to_string(), data)
}

/// Arguments that passed the security layer, deserialized.
pub struct Admitted<P> {
    pub context: SecurityContext,
    pub params: P,
}

/// Run the security layer over raw tool arguments.
///
/// A fresh context is created per call; the normalized arguments are then
/// deserialized into `P`.
pub fn admit<P: DeserializeOwned>(
    security: &SecurityManager,
    operation: Operation,
    arguments: Option<JsonObject>,
) -> Result<Admitted<P>, McpError> {
    let mut user_context = JsonObject::new();
    user_context.insert("tool".into(), json!(operation.as_str()));

    let context = security
        .create_context(Uuid::new_v4().to_string(), Some(user_context))
        .map_err(|e| security_error(&e))?;

    let mut arguments = arguments.unwrap_or_default();
    security
        .validate_operation(operation.as_str(), &mut arguments, &context)
        .map_err(|e| security_error(&e))?;

    let params = serde_json::from_value(Value::Object(arguments))
        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

    Ok(Admitted { context, params })
}

/// Structured output of every generation tool.
#[derive(Debug, Serialize, JsonSchema)]
pub struct GenerationResult {
    /// Request id of this call.
    pub operation_id: String,
    pub operation: String,
    pub model_name: String,
    /// Canonical project directory.
    pub project_path: String,
    /// Every file the generation would touch.
    pub files: Vec<PlannedFile>,
    /// Per-file preflight outcome.
    pub report: GenerationReport,
}

/// Preflight `plan` and format the outcome.
pub fn preflight_result(
    security: &SecurityManager,
    context: &SecurityContext,
    plan: GenerationPlan,
) -> CallToolResult {
    let report = GuardedWriter::new(security, context).preflight(&plan);

    let mut summary = format!(
        "Planned {} file(s) for {} '{}': {} to create, {} to modify",
        plan.files.len(),
        plan.operation,
        plan.model_name,
        report.created.len(),
        report.modified.len()
    );
    if !report.is_clean() {
        summary.push_str(&format!(", {} refused", report.errors.len()));
        for failure in &report.errors {
            summary.push_str(&format!("\n- {}: {}", failure.path, failure.message));
        }
    }
    info!(
        operation_id = context.operation_id(),
        refused = report.errors.len(),
        "{}",
        summary.lines().next().unwrap_or_default()
    );

    let result = GenerationResult {
        operation_id: context.operation_id().to_string(),
        operation: plan.operation,
        model_name: plan.model_name,
        project_path: plan.project_root.display().to_string(),
        files: plan.files,
        report,
    };

    CallToolResult {
        content: vec![Content::text(summary)],
        structured_content: serde_json::to_value(&result).ok(),
        is_error: Some(false),
        meta: None,
    }
}
