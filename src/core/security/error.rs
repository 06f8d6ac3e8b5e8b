//! Error taxonomy for the security layer.
//!
//! Every error renders to an [`ErrorPayload`] so the tool dispatcher can
//! serialize it into a protocol error without inspecting the variant.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Structured error object handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub kind: String,
    pub message: String,
    pub details: Map<String, Value>,
    pub suggestions: Vec<String>,
}

/// A malformed or disallowed input value. The caller can fix it and retry.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub details: Map<String, Value>,
    pub suggestions: Vec<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Map::new(),
            suggestions: Vec::new(),
        }
    }

    /// Attach a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Attach a remediation hint.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

/// Which path check rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PathErrorKind {
    OutOfBounds,
    DangerousPattern,
    HiddenPathRejected,
    RestrictedFile,
    RestrictedExtension,
    NotFound,
    ResolutionFailed,
}

impl PathErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutOfBounds => "OutOfBounds",
            Self::DangerousPattern => "DangerousPattern",
            Self::HiddenPathRejected => "HiddenPathRejected",
            Self::RestrictedFile => "RestrictedFile",
            Self::RestrictedExtension => "RestrictedExtension",
            Self::NotFound => "NotFound",
            Self::ResolutionFailed => "ResolutionFailed",
        }
    }
}

impl fmt::Display for PathErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sandbox escape, restricted target or existence failure. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {reason} (path '{raw}', operation '{operation}')")]
pub struct PathError {
    pub kind: PathErrorKind,
    pub reason: String,
    pub raw: String,
    pub resolved: Option<PathBuf>,
    pub operation: String,
}

impl PathError {
    pub(crate) fn new(
        kind: PathErrorKind,
        reason: impl Into<String>,
        raw: impl Into<String>,
        resolved: Option<PathBuf>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            reason: reason.into(),
            raw: raw.into(),
            resolved,
            operation: operation.into(),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        let hint = match self.kind {
            PathErrorKind::OutOfBounds | PathErrorKind::DangerousPattern => {
                "Use a path inside the project directory without '..' or '~'"
            }
            PathErrorKind::HiddenPathRejected => "Avoid hidden files and directories",
            PathErrorKind::RestrictedFile | PathErrorKind::RestrictedExtension => {
                "Target a source file the generator is allowed to manage"
            }
            PathErrorKind::NotFound => "Check that the path exists",
            PathErrorKind::ResolutionFailed => "Check the path and its permissions",
        };
        vec![hint.to_string()]
    }
}

/// The process-wide operation ceiling has been exceeded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Operation limit exceeded ({attempts} attempts, limit {limit}). Please try again later.")]
pub struct RateLimitError {
    pub attempts: u64,
    pub limit: u64,
}

/// Umbrella error for [`SecurityManager`](super::SecurityManager) calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SecurityError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    RateLimit(#[from] RateLimitError),
}

impl SecurityError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Path(_) => "PathError",
            Self::RateLimit(_) => "RateLimitError",
        }
    }

    /// Whether this rejection should land in the flagged-operation log.
    ///
    /// Every path rejection is flagged. A rate-limit rejection is flagged
    /// only on the attempt that trips the ceiling; later attempts are
    /// counted as rejections but do not grow the log.
    pub fn is_suspicious(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::Path(_) => true,
            Self::RateLimit(e) => e.attempts == e.limit + 1,
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            Self::Validation(e) => ErrorPayload {
                kind: self.kind().to_string(),
                message: e.message.clone(),
                details: e.details.clone(),
                suggestions: e.suggestions.clone(),
            },
            Self::Path(e) => {
                let mut details = Map::new();
                details.insert("reason".into(), json!(e.kind.as_str()));
                details.insert("path".into(), json!(e.raw));
                if let Some(resolved) = &e.resolved {
                    details.insert("resolved_path".into(), json!(resolved.display().to_string()));
                }
                details.insert("operation".into(), json!(e.operation));
                ErrorPayload {
                    kind: self.kind().to_string(),
                    message: e.to_string(),
                    details,
                    suggestions: e.suggestions(),
                }
            }
            Self::RateLimit(e) => {
                let mut details = Map::new();
                details.insert("attempts".into(), json!(e.attempts));
                details.insert("limit".into(), json!(e.limit));
                ErrorPayload {
                    kind: self.kind().to_string(),
                    message: e.to_string(),
                    details,
                    suggestions: vec!["Back off before issuing further operations".to_string()],
                }
            }
        }
    }
}
