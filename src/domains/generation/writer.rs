//! The file-operation gate.
//!
//! Every file of a [`GenerationPlan`] goes through the path validator and
//! the access controller before it is rendered or written. A refused file
//! is reported and skipped; the rest of the batch still runs.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use schemars::JsonSchema;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::plan::{FileAction, GenerationPlan, PlannedFile};
use crate::core::security::{CanonicalPath, PathError, SecurityContext, SecurityManager};

/// Produces the contents of one planned file.
///
/// For [`FileAction::Modify`] entries the renderer receives the current
/// contents and returns the complete replacement.
pub trait FileRenderer {
    fn render(
        &self,
        plan: &GenerationPlan,
        file: &PlannedFile,
        existing: Option<&str>,
    ) -> anyhow::Result<String>;
}

/// Why one file of a plan was not written.
#[derive(Debug, Error)]
pub enum FileError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("write access denied for '{0}'")]
    AccessDenied(String),

    #[error("'{0}' already exists and will not be overwritten")]
    AlreadyExists(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FileError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Path(e) => e.kind.as_str(),
            Self::AccessDenied(_) => "AccessDenied",
            Self::AlreadyExists(_) => "AlreadyExists",
            Self::Render(_) => "RenderFailed",
            Self::Io(_) => "IoError",
        }
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct FileFailure {
    pub path: String,
    pub kind: String,
    pub message: String,
}

/// Outcome of a preflight or apply run.
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
pub struct GenerationReport {
    /// True when nothing was written.
    pub dry_run: bool,
    pub created: Vec<String>,
    pub modified: Vec<String>,
    pub errors: Vec<FileFailure>,
}

impl GenerationReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, file: &PlannedFile) {
        match file.action {
            FileAction::Create => self.created.push(file.relative_path.clone()),
            FileAction::Modify => self.modified.push(file.relative_path.clone()),
        }
    }

    fn fail(&mut self, file: &PlannedFile, error: FileError) {
        warn!(path = %file.relative_path, kind = error.kind(), "File refused: {}", error);
        self.errors.push(FileFailure {
            path: file.relative_path.clone(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        });
    }
}

/// Gate between a plan and the disk, bound to one call's security context.
pub struct GuardedWriter<'a> {
    security: &'a SecurityManager,
    context: &'a SecurityContext,
}

impl<'a> GuardedWriter<'a> {
    pub fn new(security: &'a SecurityManager, context: &'a SecurityContext) -> Self {
        Self { security, context }
    }

    /// Check every file of `plan` without touching the disk.
    pub fn preflight(&self, plan: &GenerationPlan) -> GenerationReport {
        let mut report = GenerationReport {
            dry_run: true,
            ..Default::default()
        };
        for file in &plan.files {
            match self.check(plan, file) {
                Ok(_) => report.record(file),
                Err(e) => report.fail(file, e),
            }
        }
        debug!(
            accepted = report.created.len() + report.modified.len(),
            refused = report.errors.len(),
            "Preflight finished"
        );
        report
    }

    /// Check, render and write every file of `plan`.
    pub fn apply(&self, plan: &GenerationPlan, renderer: &dyn FileRenderer) -> GenerationReport {
        let mut report = GenerationReport::default();
        for file in &plan.files {
            match self.write_one(plan, file, renderer) {
                Ok(()) => report.record(file),
                Err(e) => report.fail(file, e),
            }
        }
        info!(
            created = report.created.len(),
            modified = report.modified.len(),
            failed = report.errors.len(),
            "Generation applied"
        );
        report
    }

    fn check(&self, plan: &GenerationPlan, file: &PlannedFile) -> Result<CanonicalPath, FileError> {
        let target = plan.target(file);
        let must_exist = file.action == FileAction::Modify;
        let path = self.security.path_validator().validate(
            &target.to_string_lossy(),
            self.context.allowed_root(),
            "write",
            must_exist,
        )?;

        if !self
            .security
            .access_controller()
            .can_write(path.as_path(), &plan.project_root)
        {
            return Err(FileError::AccessDenied(file.relative_path.clone()));
        }
        if file.action == FileAction::Create && path.as_path().exists() {
            return Err(FileError::AlreadyExists(file.relative_path.clone()));
        }
        Ok(path)
    }

    fn write_one(
        &self,
        plan: &GenerationPlan,
        file: &PlannedFile,
        renderer: &dyn FileRenderer,
    ) -> Result<(), FileError> {
        let path = self.check(plan, file)?;
        let existing = match file.action {
            FileAction::Modify => Some(fs::read_to_string(&path)?),
            FileAction::Create => None,
        };
        let contents = renderer
            .render(plan, file, existing.as_deref())
            .map_err(|e| FileError::Render(e.to_string()))?;

        match file.action {
            FileAction::Create => create_new(path.as_path(), &contents, &file.relative_path),
            FileAction::Modify => Ok(fs::write(&path, contents)?),
        }
    }
}

/// Write a file that must not exist yet, creating parent directories.
fn create_new(path: &Path, contents: &str, display: &str) -> Result<(), FileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut handle = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => FileError::AlreadyExists(display.to_string()),
            _ => FileError::Io(e),
        })?;
    handle.write_all(contents.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SecurityConfig;
    use crate::core::security::SecurityStats;
    use crate::domains::generation::plan::owned_strings;
    use chrono::Utc;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct EchoRenderer;

    impl FileRenderer for EchoRenderer {
        fn render(
            &self,
            plan: &GenerationPlan,
            file: &PlannedFile,
            existing: Option<&str>,
        ) -> anyhow::Result<String> {
            Ok(format!(
                "{}// {} {}\n",
                existing.unwrap_or_default(),
                plan.model_name,
                file.relative_path
            ))
        }
    }

    struct FailingRenderer;

    impl FileRenderer for FailingRenderer {
        fn render(&self, _: &GenerationPlan, file: &PlannedFile, _: Option<&str>) -> anyhow::Result<String> {
            anyhow::bail!("no template for {:?}", file.kind)
        }
    }

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/routes")).unwrap();
        fs::write(dir.path().join("src/routes/mod.rs"), "// routes\n").unwrap();
        dir
    }

    fn setup(dir: &TempDir) -> (SecurityManager, SecurityContext) {
        let security = SecurityManager::new(
            SecurityConfig::new(dir.path()),
            Arc::new(SecurityStats::new()),
        );
        let context = security.create_context("test", None).unwrap();
        (security, context)
    }

    #[test]
    fn test_preflight_does_not_write() {
        let dir = project();
        let (security, context) = setup(&dir);
        let plan = GenerationPlan::model("post", &[], context.allowed_root(), Utc::now());

        let report = GuardedWriter::new(&security, &context).preflight(&plan);
        assert!(report.dry_run);
        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(report.created.len(), 2);
        assert!(!dir.path().join("src/models/post.rs").exists());
    }

    #[test]
    fn test_apply_creates_and_modifies() {
        let dir = project();
        let (security, context) = setup(&dir);
        let plan = GenerationPlan::controller_view(
            "post",
            context.allowed_root(),
            &owned_strings(&["index"]),
            &owned_strings(&["list"]),
        );

        let report = GuardedWriter::new(&security, &context).apply(&plan, &EchoRenderer);
        assert!(report.is_clean(), "{:?}", report.errors);
        assert_eq!(report.modified, vec!["src/routes/mod.rs"]);

        let controller = fs::read_to_string(dir.path().join("src/controllers/post.rs")).unwrap();
        assert_eq!(controller, "// post src/controllers/post.rs\n");
        let routes = fs::read_to_string(dir.path().join("src/routes/mod.rs")).unwrap();
        assert_eq!(routes, "// routes\n// post src/routes/mod.rs\n");
        assert!(dir.path().join("src/views/post/list.html.tera").exists());
    }

    #[test]
    fn test_existing_file_is_never_overwritten() {
        let dir = project();
        fs::create_dir_all(dir.path().join("src/models")).unwrap();
        fs::write(dir.path().join("src/models/post.rs"), "keep me").unwrap();
        let (security, context) = setup(&dir);
        let plan = GenerationPlan::model("post", &[], context.allowed_root(), Utc::now());

        let report = GuardedWriter::new(&security, &context).apply(&plan, &EchoRenderer);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, "AlreadyExists");
        // The migration still went through.
        assert_eq!(report.created.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("src/models/post.rs")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn test_modify_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let (security, context) = setup(&dir);
        let plan = GenerationPlan::scaffold("post", &[], context.allowed_root(), Utc::now(), false);

        let report = GuardedWriter::new(&security, &context).preflight(&plan);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "src/routes/mod.rs");
        assert_eq!(report.errors[0].kind, "NotFound");
    }

    #[test]
    fn test_render_failure_is_per_file() {
        let dir = project();
        let (security, context) = setup(&dir);
        let plan = GenerationPlan::model("post", &[], context.allowed_root(), Utc::now());

        let report = GuardedWriter::new(&security, &context).apply(&plan, &FailingRenderer);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors.iter().all(|e| e.kind == "RenderFailed"));
        assert!(!dir.path().join("src/models").exists());
    }

    #[test]
    fn test_project_outside_root_is_refused() {
        let dir = project();
        let elsewhere = TempDir::new().unwrap();
        let (security, context) = setup(&dir);
        let plan = GenerationPlan::model("post", &[], elsewhere.path(), Utc::now());

        let report = GuardedWriter::new(&security, &context).preflight(&plan);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors.iter().all(|e| e.kind == "OutOfBounds"));
    }
}
