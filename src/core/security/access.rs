//! Capability checks for read, write and delete.
//!
//! Decisions are lexical and independent of whether the file exists. None
//! of the checks fail; an out-of-root path is simply not permitted.

use std::path::Path;

use super::paths::relative_key;

/// Directories nothing may touch, matched as a prefix of the root-relative path.
pub const PROTECTED_DIRECTORIES: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "target",
    "build",
    "dist",
    "node_modules",
    ".cargo",
    ".venv",
    "env",
];

/// Top-level manifests that may be read but never written or deleted.
pub const READ_ONLY_FILES: &[&str] = &[
    "cargo.toml",
    "cargo.lock",
    "package.json",
    "requirements.txt",
    ".gitignore",
    ".gitattributes",
];

/// Subtrees the generator is allowed to write into.
pub const WRITABLE_PREFIXES: &[&str] = &[
    "src/models/",
    "src/controllers/",
    "src/views/",
    "src/routes/",
    "migration/src/",
    "tests/",
    "examples/",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessController;

impl AccessController {
    pub fn new() -> Self {
        Self
    }

    pub fn can_read(&self, path: &Path, root: &Path) -> bool {
        relative_key(path, root).is_some_and(|key| !is_protected(&key))
    }

    pub fn can_write(&self, path: &Path, root: &Path) -> bool {
        let Some(key) = relative_key(path, root) else {
            return false;
        };
        if is_protected(&key) || READ_ONLY_FILES.contains(&key.as_str()) {
            return false;
        }
        WRITABLE_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
    }

    /// Deletion follows exactly the write policy.
    pub fn can_delete(&self, path: &Path, root: &Path) -> bool {
        self.can_write(path, root)
    }

    pub fn protected_directory_count(&self) -> usize {
        PROTECTED_DIRECTORIES.len()
    }
}

fn is_protected(key: &str) -> bool {
    PROTECTED_DIRECTORIES.iter().any(|dir| {
        key.strip_prefix(dir)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}
