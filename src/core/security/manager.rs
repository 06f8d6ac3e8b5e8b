use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::access::AccessController;
use super::context::SecurityContext;
use super::error::{PathError, PathErrorKind, RateLimitError, SecurityError};
use super::parameters::{Operation, ParameterValidator};
use super::path_validator::PathValidator;
use super::sanitizer::InputSanitizer;
use super::stats::{FlaggedOperation, SecurityStatistics, SecurityStats};
use crate::core::config::SecurityConfig;

/// How many flagged operations a statistics snapshot includes.
const RECENT_FLAG_LIMIT: usize = 20;

/// Entry point of the security layer.
///
/// Owns the validators and a shared [`SecurityStats`]. Build one at startup
/// and thread it to every tool; tests build their own.
#[derive(Debug)]
pub struct SecurityManager {
    config: SecurityConfig,
    stats: Arc<SecurityStats>,
    path_validator: PathValidator,
    access_controller: AccessController,
    sanitizer: InputSanitizer,
    parameter_validator: ParameterValidator,
}

impl SecurityManager {
    pub fn new(config: SecurityConfig, stats: Arc<SecurityStats>) -> Self {
        Self {
            config,
            stats,
            path_validator: PathValidator::new(),
            access_controller: AccessController::new(),
            sanitizer: InputSanitizer::new(),
            parameter_validator: ParameterValidator::new(),
        }
    }

    pub fn path_validator(&self) -> &PathValidator {
        &self.path_validator
    }

    pub fn access_controller(&self) -> &AccessController {
        &self.access_controller
    }

    pub fn sanitizer(&self) -> &InputSanitizer {
        &self.sanitizer
    }

    pub fn parameter_validator(&self) -> &ParameterValidator {
        &self.parameter_validator
    }

    /// Build the immutable context for one call.
    ///
    /// The configured root and working directory are canonicalized here; a
    /// root that cannot be resolved fails the call.
    pub fn create_context(
        &self,
        request_id: impl Into<String>,
        user_context: Option<Map<String, Value>>,
    ) -> Result<SecurityContext, SecurityError> {
        let operation_id = request_id.into();
        let canonicalize = |path: &std::path::Path| {
            path.canonicalize().map_err(|e| {
                PathError::new(
                    PathErrorKind::ResolutionFailed,
                    format!("cannot resolve configured directory: {}", e),
                    path.display().to_string(),
                    None,
                    "create_context",
                )
            })
        };

        let allowed_root = canonicalize(self.config.project_root.as_path())?;
        let cwd = canonicalize(self.config.effective_working_dir().as_path())?;

        Ok(SecurityContext::new(
            allowed_root,
            cwd,
            operation_id,
            user_context.unwrap_or_default(),
        ))
    }

    /// Count, rate-limit and normalize one operation.
    ///
    /// For generation operations `params` is rewritten in place: the model
    /// name and fields are replaced by their sanitized forms and
    /// `project_path` by the canonical project directory (inserted when
    /// absent). Every call counts as an attempt, whatever the outcome.
    #[instrument(skip(self, params, context), fields(operation_id = %context.operation_id()))]
    pub fn validate_operation(
        &self,
        operation: &str,
        params: &mut Map<String, Value>,
        context: &SecurityContext,
    ) -> Result<(), SecurityError> {
        let attempts = self.stats.record_attempt();

        let result = self
            .check_rate_limit(attempts)
            .and_then(|()| match operation.parse::<Operation>() {
                Ok(_) => self.validate_generation(operation, params, context),
                Err(_) => Ok(()),
            });

        match &result {
            Ok(()) => debug!(operation, "Operation accepted"),
            Err(e) => self.record_rejection(operation, context, e),
        }
        result
    }

    fn check_rate_limit(&self, attempts: u64) -> Result<(), SecurityError> {
        let limit = self.config.max_operations;
        if attempts > limit {
            return Err(RateLimitError { attempts, limit }.into());
        }
        Ok(())
    }

    fn validate_generation(
        &self,
        operation: &str,
        params: &mut Map<String, Value>,
        context: &SecurityContext,
    ) -> Result<(), SecurityError> {
        if let Some(Value::String(name)) = params.get("model_name") {
            let sanitized = self.sanitizer.sanitize_name(name)?;
            params.insert("model_name".into(), Value::String(sanitized));
        }

        if let Some(fields) = params.get("fields").and_then(string_list) {
            let sanitized = self.sanitizer.sanitize_field_list(&fields)?;
            params.insert("fields".into(), sanitized.into());
        }

        if let Some(Value::String(path)) = params.get("project_path") {
            let sanitized = self.sanitizer.sanitize_path(path, context.cwd())?;
            params.insert("project_path".into(), Value::String(sanitized));
        }

        self.parameter_validator.validate(operation, params)?;

        let raw_path = match params.get("project_path") {
            Some(Value::String(path)) => path.clone(),
            _ => context.allowed_root().display().to_string(),
        };
        let canonical = self.path_validator.validate(
            &raw_path,
            context.allowed_root(),
            "generation",
            false,
        )?;
        params.insert(
            "project_path".into(),
            Value::String(canonical.as_path().display().to_string()),
        );

        Ok(())
    }

    fn record_rejection(&self, operation: &str, context: &SecurityContext, error: &SecurityError) {
        self.stats.record_rejection();
        warn!(
            operation,
            operation_id = context.operation_id(),
            kind = error.kind(),
            "Operation rejected: {}",
            error
        );
        if error.is_suspicious() {
            self.stats.flag(FlaggedOperation::now(
                context.operation_id(),
                operation,
                error.kind(),
                error.to_string(),
            ));
        }
    }

    /// Aggregate counters for observability.
    pub fn statistics(&self) -> SecurityStatistics {
        let flagged = self.stats.flagged();
        let total = self.stats.attempts();
        let status = if total > self.config.max_operations {
            "rate_limited"
        } else {
            "healthy"
        };

        SecurityStatistics {
            total_operations: total,
            rejected_operations: self.stats.rejections(),
            flagged_operations: flagged.len(),
            protected_directories: self.access_controller.protected_directory_count(),
            operation_limit: self.config.max_operations,
            security_status: status.to_string(),
            recent_flags: flagged.into_iter().rev().take(RECENT_FLAG_LIMIT).collect(),
        }
    }
}

/// Borrow a JSON array as strings, or `None` if any element is not a string.
fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}
