use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use tracing::debug;

use super::error::{PathError, PathErrorKind};
use super::paths::CanonicalPath;

/// Substrings that must never appear in a checked path (matched lower-cased).
static DANGEROUS_PATTERNS: &[&str] = &[
    "../", "..\\", "~/", "/etc/", "/var/", "/usr/", "/bin/", "/sbin/", "/proc/", "/sys/",
];

/// Dot-prefixed names tolerated by the hidden-segment check.
static HIDDEN_ALLOWED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [".git", ".github", ".gitignore", ".gitattributes", ".gitmodules"]
        .into_iter()
        .collect()
});

static RESTRICTED_FILES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        ".git",
        ".gitignore",
        ".gitmodules",
        ".svn",
        ".hg",
        ".bzr",
        "id_rsa",
        "id_rsa.pub",
        ".env",
        ".env.local",
        ".env.production",
        "package-lock.json",
        "yarn.lock",
        "cargo.lock",
        "node_modules",
        "target",
        "build",
        "dist",
        ".ds_store",
        "thumbs.db",
    ]
    .into_iter()
    .collect()
});

static RESTRICTED_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "exe", "bat", "cmd", "com", "pif", "scr", "vbs", "js", "jar", "sh", "pyc", "pyo", "pyd",
        "so", "dll", "dylib",
    ]
    .into_iter()
    .collect()
});

/// Canonicalizes a path and bounds it to an allowed root.
///
/// Checks run in a fixed order and the first failure wins:
///
/// 1. resolve to an absolute, symlink-resolved path (relative input is
///    joined onto the root first)
/// 2. containment under the canonical root
/// 3. dangerous substrings
/// 4. hidden segments
/// 5. restricted file names
/// 6. restricted extensions
/// 7. executable files
/// 8. existence, when required
///
/// Pattern and hidden-segment checks look at the part of the path below the
/// root (plus the raw input when it is relative), so a project that itself
/// lives under e.g. `/var/www` stays usable.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathValidator;

impl PathValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate `raw_path` against `allowed_root` for `operation`.
    ///
    /// Nothing is cached: filesystem state may change between two calls with
    /// the same input.
    pub fn validate(
        &self,
        raw_path: &str,
        allowed_root: &Path,
        operation: &str,
        must_exist: bool,
    ) -> Result<CanonicalPath, PathError> {
        let fail = |kind, reason: String, resolved: Option<&Path>| {
            PathError::new(kind, reason, raw_path, resolved.map(Path::to_path_buf), operation)
        };

        let root = allowed_root.canonicalize().map_err(|e| {
            fail(
                PathErrorKind::ResolutionFailed,
                format!("cannot resolve allowed root '{}': {}", allowed_root.display(), e),
                None,
            )
        })?;

        let input = Path::new(raw_path);
        let joined = if input.is_absolute() {
            input.to_path_buf()
        } else {
            root.join(input)
        };
        let resolved = resolve(&joined).map_err(|e| {
            fail(
                PathErrorKind::ResolutionFailed,
                format!("cannot resolve path: {}", e),
                None,
            )
        })?;

        let Ok(below_root) = resolved.strip_prefix(&root) else {
            return Err(fail(
                PathErrorKind::OutOfBounds,
                format!("path is outside the allowed directory '{}'", root.display()),
                Some(&resolved),
            ));
        };

        let mut scanned = vec![format!("/{}", below_root.to_string_lossy()).to_lowercase()];
        if !input.is_absolute() {
            scanned.push(raw_path.to_lowercase());
        }
        for haystack in &scanned {
            if let Some(pattern) = DANGEROUS_PATTERNS.iter().find(|p| haystack.contains(*p)) {
                return Err(fail(
                    PathErrorKind::DangerousPattern,
                    format!("dangerous path pattern detected: '{}'", pattern),
                    Some(&resolved),
                ));
            }
        }

        for segment in below_root.components() {
            let segment = segment.as_os_str().to_string_lossy();
            if segment.starts_with('.') && !HIDDEN_ALLOWED.contains(segment.as_ref()) {
                return Err(fail(
                    PathErrorKind::HiddenPathRejected,
                    format!("hidden files and directories are not allowed: '{}'", segment),
                    Some(&resolved),
                ));
            }
        }

        let file_name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if RESTRICTED_FILES.contains(file_name.as_str()) {
            return Err(fail(
                PathErrorKind::RestrictedFile,
                format!("access to restricted file is not allowed: '{}'", file_name),
                Some(&resolved),
            ));
        }

        if let Some(ext) = resolved.extension().map(|e| e.to_string_lossy().to_lowercase())
            && RESTRICTED_EXTENSIONS.contains(ext.as_str())
        {
            return Err(fail(
                PathErrorKind::RestrictedExtension,
                format!("files with extension '.{}' are not allowed: '{}'", ext, file_name),
                Some(&resolved),
            ));
        }

        if is_executable_file(&resolved) {
            return Err(fail(
                PathErrorKind::RestrictedFile,
                format!("executable files are not allowed: '{}'", file_name),
                Some(&resolved),
            ));
        }

        if must_exist && !resolved.exists() {
            return Err(fail(
                PathErrorKind::NotFound,
                "path does not exist".to_string(),
                Some(&resolved),
            ));
        }

        debug!(path = %resolved.display(), operation, "Path validated");
        Ok(CanonicalPath::new(resolved))
    }
}

/// Resolve `path` (absolute) against the filesystem.
///
/// Existing prefixes are canonicalized so symlinks are followed; once a
/// component does not exist the remainder is appended lexically. A `..`
/// that steps back onto an existing directory resumes canonicalization, so
/// a later symlink is still followed.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    match path.canonicalize() {
        Ok(canonical) => return Ok(canonical),
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        Err(_) => {}
    }

    let mut resolved = PathBuf::new();
    let mut exists = true;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
                if !exists && resolved.try_exists()? {
                    resolved = resolved.canonicalize()?;
                    exists = true;
                }
            }
            Component::Normal(name) => {
                resolved.push(name);
                if exists {
                    match resolved.canonicalize() {
                        Ok(canonical) => resolved = canonical,
                        Err(e) if e.kind() == io::ErrorKind::NotFound => exists = false,
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }

    Ok(resolved)
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(_path: &Path) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/models")).unwrap();
        fs::write(dir.path().join("src/models/user.rs"), "pub struct User;").unwrap();
        dir
    }

    fn kind_of(result: Result<CanonicalPath, PathError>) -> PathErrorKind {
        result.unwrap_err().kind
    }

    #[test]
    fn test_existing_file_inside_root() {
        let dir = project();
        let result = PathValidator::new()
            .validate("src/models/user.rs", dir.path(), "write", true)
            .unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(result.as_path(), root.join("src/models/user.rs"));
    }

    #[test]
    fn test_nonexistent_file_resolves_when_not_required() {
        let dir = project();
        let result = PathValidator::new()
            .validate("src/models/post.rs", dir.path(), "write", false)
            .unwrap();
        assert!(result.as_path().ends_with("src/models/post.rs"));
    }

    #[test]
    fn test_missing_file_when_required() {
        let dir = project();
        let result = PathValidator::new().validate("src/models/post.rs", dir.path(), "read", true);
        assert_eq!(kind_of(result), PathErrorKind::NotFound);
    }

    #[test]
    fn test_traversal_is_out_of_bounds() {
        let dir = project();
        let result = PathValidator::new().validate("../../etc/passwd", dir.path(), "read", false);
        let err = result.unwrap_err();
        assert_eq!(err.kind, PathErrorKind::OutOfBounds);
        assert_eq!(err.raw, "../../etc/passwd");
        assert_eq!(err.operation, "read");
        assert!(err.resolved.is_some());
    }

    #[test]
    fn test_absolute_outside_root() {
        let dir = project();
        let outside = TempDir::new().unwrap();
        let target = outside.path().join("x.rs");
        let result =
            PathValidator::new().validate(target.to_str().unwrap(), dir.path(), "read", false);
        assert_eq!(kind_of(result), PathErrorKind::OutOfBounds);
    }

    #[test]
    fn test_root_itself_is_accepted() {
        let dir = project();
        let result = PathValidator::new()
            .validate(dir.path().to_str().unwrap(), dir.path(), "generation", false)
            .unwrap();
        assert_eq!(result.as_path(), dir.path().canonicalize().unwrap());
    }

    #[test]
    fn test_inner_traversal_in_relative_input_is_dangerous() {
        let dir = project();
        let result =
            PathValidator::new().validate("src/../src/models/user.rs", dir.path(), "read", false);
        assert_eq!(kind_of(result), PathErrorKind::DangerousPattern);
    }

    #[test]
    fn test_system_like_subdirectory_is_dangerous() {
        let dir = project();
        let result = PathValidator::new().validate("etc/passwd.txt", dir.path(), "read", false);
        assert_eq!(kind_of(result), PathErrorKind::DangerousPattern);
    }

    #[test]
    fn test_hidden_segment_rejected() {
        let dir = project();
        let result = PathValidator::new().validate(".secret/config.rs", dir.path(), "read", false);
        assert_eq!(kind_of(result), PathErrorKind::HiddenPathRejected);
    }

    #[test]
    fn test_github_directory_allowed() {
        let dir = project();
        let result =
            PathValidator::new().validate(".github/workflows/ci.yml", dir.path(), "read", false);
        assert!(result.is_ok());
    }

    #[test]
    fn test_restricted_file_names() {
        let dir = project();
        let validator = PathValidator::new();
        assert_eq!(
            kind_of(validator.validate("Cargo.lock", dir.path(), "write", false)),
            PathErrorKind::RestrictedFile
        );
        assert_eq!(
            kind_of(validator.validate("config/id_rsa", dir.path(), "read", false)),
            PathErrorKind::RestrictedFile
        );
        assert_eq!(
            kind_of(validator.validate(".gitignore", dir.path(), "write", false)),
            PathErrorKind::RestrictedFile
        );
    }

    #[test]
    fn test_restricted_extensions() {
        let dir = project();
        let validator = PathValidator::new();
        assert_eq!(
            kind_of(validator.validate("scripts/deploy.SH", dir.path(), "write", false)),
            PathErrorKind::RestrictedExtension
        );
        assert_eq!(
            kind_of(validator.validate("lib/native.so", dir.path(), "write", false)),
            PathErrorKind::RestrictedExtension
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_file_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = project();
        let tool = dir.path().join("src/run_me");
        fs::write(&tool, "#!/bin/true").unwrap();
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

        let result = PathValidator::new().validate("src/run_me", dir.path(), "read", false);
        assert_eq!(kind_of(result), PathErrorKind::RestrictedFile);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escaping_root_is_out_of_bounds() {
        use std::os::unix::fs::symlink;

        let dir = project();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.rs"), "x").unwrap();
        symlink(outside.path(), dir.path().join("src/linked")).unwrap();

        let result =
            PathValidator::new().validate("src/linked/secret.rs", dir.path(), "read", false);
        assert_eq!(kind_of(result), PathErrorKind::OutOfBounds);
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_step_after_missing_segment_cannot_escape() {
        use std::os::unix::fs::symlink;

        let dir = project();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.rs"), "x").unwrap();
        symlink(outside.path(), dir.path().join("link")).unwrap();

        let raw = format!("{}/missing/../link/secret.rs", dir.path().display());
        let result = PathValidator::new().validate(&raw, dir.path(), "read", true);
        assert_eq!(kind_of(result), PathErrorKind::OutOfBounds);

        let raw = format!("{}/missing/../link/new.rs", dir.path().display());
        let result = PathValidator::new().validate(&raw, dir.path(), "write", false);
        assert_eq!(kind_of(result), PathErrorKind::OutOfBounds);
    }

    #[test]
    fn test_parent_step_after_missing_segment_stays_inside() {
        let dir = project();
        let raw = format!("{}/missing/../src/models/user.rs", dir.path().display());
        let result = PathValidator::new()
            .validate(&raw, dir.path(), "read", true)
            .unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(result.as_path(), root.join("src/models/user.rs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_within_root_resolves_to_target() {
        use std::os::unix::fs::symlink;

        let dir = project();
        symlink(dir.path().join("src/models"), dir.path().join("src/alias")).unwrap();

        let result = PathValidator::new()
            .validate("src/alias/user.rs", dir.path(), "read", true)
            .unwrap();
        assert!(result.as_path().ends_with("src/models/user.rs"));
    }

    #[test]
    fn test_missing_root_fails_resolution() {
        let dir = project();
        let missing = dir.path().join("nope");
        let result = PathValidator::new().validate("a.rs", &missing, "read", false);
        assert_eq!(kind_of(result), PathErrorKind::ResolutionFailed);
    }
}
