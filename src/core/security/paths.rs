//! Lexical path helpers shared by the sanitizer, the validator and the
//! access controller.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// An absolute, symlink-resolved path known to lie under an allowed root.
///
/// Only [`PathValidator`](super::PathValidator) constructs values of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPath(PathBuf);

impl CanonicalPath {
    pub(super) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    /// Borrow the underlying path.
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Consume into the underlying `PathBuf`.
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for CanonicalPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// `..` directly under the filesystem root is dropped, matching how the
/// kernel resolves `/..`. Leading `..` on a relative path is kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Express `path` relative to `root` as a lower-cased, `/`-joined string.
///
/// Relative inputs are taken as already relative to `root`. Returns `None`
/// when the normalized path does not lie under `root`.
pub fn relative_key(path: &Path, root: &Path) -> Option<String> {
    let root = normalize_lexically(root);
    let joined = if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&root.join(path))
    };

    let relative = joined.strip_prefix(&root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_lowercase())
        .collect();
    Some(segments.join("/"))
}
