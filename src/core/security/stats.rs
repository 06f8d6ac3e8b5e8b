//! Process-wide operation counters and the flagged-operation log.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use schemars::JsonSchema;
use serde::Serialize;

/// A rejected operation worth a second look (path or rate-limit rejection).
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FlaggedOperation {
    pub operation_id: String,
    pub operation: String,
    pub kind: String,
    pub message: String,
    /// RFC 3339 timestamp, UTC.
    pub flagged_at: String,
}

impl FlaggedOperation {
    pub fn now(
        operation_id: impl Into<String>,
        operation: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            operation: operation.into(),
            kind: kind.into(),
            message: message.into(),
            flagged_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Append-only counters shared by every caller of a
/// [`SecurityManager`](super::SecurityManager).
///
/// Constructed explicitly by the startup routine; a fresh instance starts
/// from zero, which is how tests get a clean slate.
#[derive(Debug, Default)]
pub struct SecurityStats {
    attempts: AtomicU64,
    rejections: AtomicU64,
    flagged: Mutex<Vec<FlaggedOperation>>,
}

impl SecurityStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one attempt and return the running total including it.
    pub fn record_attempt(&self) -> u64 {
        self.attempts.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::SeqCst);
    }

    pub fn flag(&self, entry: FlaggedOperation) {
        self.flagged
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(entry);
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn rejections(&self) -> u64 {
        self.rejections.load(Ordering::SeqCst)
    }

    /// Copy of the flagged-operation log, oldest first.
    pub fn flagged(&self) -> Vec<FlaggedOperation> {
        self.flagged
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Snapshot returned by [`SecurityManager::statistics`](super::SecurityManager::statistics).
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SecurityStatistics {
    pub total_operations: u64,
    pub rejected_operations: u64,
    pub flagged_operations: usize,
    pub protected_directories: usize,
    pub operation_limit: u64,
    pub security_status: String,
    pub recent_flags: Vec<FlaggedOperation>,
}
