use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// Per-call security context.
///
/// Built once per request by [`SecurityManager::create_context`] and never
/// mutated afterwards.
///
/// [`SecurityManager::create_context`]: super::SecurityManager::create_context
#[derive(Debug, Clone)]
pub struct SecurityContext {
    allowed_root: PathBuf,
    cwd: PathBuf,
    operation_id: String,
    user_context: Map<String, Value>,
}

impl SecurityContext {
    pub(super) fn new(
        allowed_root: PathBuf,
        cwd: PathBuf,
        operation_id: String,
        user_context: Map<String, Value>,
    ) -> Self {
        Self {
            allowed_root,
            cwd,
            operation_id,
            user_context,
        }
    }

    /// Canonical directory every path of this call must stay under.
    pub fn allowed_root(&self) -> &Path {
        &self.allowed_root
    }

    /// Canonical base for relative input paths.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    pub fn user_context(&self) -> &Map<String, Value> {
        &self.user_context
    }
}
