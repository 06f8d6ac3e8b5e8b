//! Generation plans: which files a generation touches, and how.
//!
//! A plan is pure data. Nothing here reads or writes the filesystem; see
//! [`GuardedWriter`](super::GuardedWriter) for that.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;

use crate::core::security::Operation;

pub const DEFAULT_ACTIONS: &[&str] = &["index", "show", "create", "update", "delete"];
pub const DEFAULT_VIEW_TYPES: &[&str] = &["list", "show", "form", "edit"];

const MIGRATION_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const ROUTES_FILE: &str = "src/routes/mod.rs";

/// What kind of project file an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Model,
    Migration,
    Controller,
    View,
    Routes,
}

/// Whether a file is new or an edit of an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    Create,
    Modify,
}

/// One file of a plan, relative to the project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PlannedFile {
    /// Project-relative path, `/`-separated.
    pub relative_path: String,
    pub kind: FileKind,
    pub action: FileAction,
}

impl PlannedFile {
    fn create(relative_path: impl Into<String>, kind: FileKind) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind,
            action: FileAction::Create,
        }
    }

    fn modify(relative_path: impl Into<String>, kind: FileKind) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind,
            action: FileAction::Modify,
        }
    }
}

/// Everything a renderer needs to produce the files of one generation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationPlan {
    pub operation: String,
    pub model_name: String,
    /// Canonical project directory every `relative_path` hangs off.
    pub project_root: PathBuf,
    pub fields: Vec<String>,
    pub actions: Vec<String>,
    pub files: Vec<PlannedFile>,
}

impl GenerationPlan {
    fn empty(operation: Operation, model_name: &str, project_root: &Path) -> Self {
        Self {
            operation: operation.as_str().to_string(),
            model_name: model_name.to_string(),
            project_root: project_root.to_path_buf(),
            fields: Vec::new(),
            actions: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Model file plus its migration, stamped with `now`.
    pub fn model(model_name: &str, fields: &[String], project_root: &Path, now: DateTime<Utc>) -> Self {
        let mut plan = Self::empty(Operation::GenerateModel, model_name, project_root);
        plan.fields = fields.to_vec();
        plan.push_model_files(now);
        plan
    }

    /// Model, migration, controller, optional views and a routes edit.
    pub fn scaffold(
        model_name: &str,
        fields: &[String],
        project_root: &Path,
        now: DateTime<Utc>,
        include_views: bool,
    ) -> Self {
        let mut plan = Self::empty(Operation::GenerateScaffold, model_name, project_root);
        plan.fields = fields.to_vec();
        plan.actions = owned_strings(DEFAULT_ACTIONS);
        plan.push_model_files(now);
        plan.push_controller();
        if include_views {
            let views = owned_strings(DEFAULT_VIEW_TYPES);
            plan.push_views(&views);
        }
        plan.files.push(PlannedFile::modify(ROUTES_FILE, FileKind::Routes));
        plan
    }

    /// Controller and views for a model that already exists.
    pub fn controller_view(
        model_name: &str,
        project_root: &Path,
        actions: &[String],
        view_types: &[String],
    ) -> Self {
        let mut plan = Self::empty(Operation::GenerateControllerView, model_name, project_root);
        plan.actions = actions.to_vec();
        plan.push_controller();
        plan.push_views(view_types);
        plan.files.push(PlannedFile::modify(ROUTES_FILE, FileKind::Routes));
        plan
    }

    /// Absolute target of `file` (not yet validated).
    pub fn target(&self, file: &PlannedFile) -> PathBuf {
        file.relative_path
            .split('/')
            .fold(self.project_root.clone(), |path, segment| path.join(segment))
    }

    fn push_model_files(&mut self, now: DateTime<Utc>) {
        let name = &self.model_name;
        let model = format!("src/models/{}.rs", name);
        let migration = format!(
            "migration/src/m_{}_create_{}s.rs",
            now.format(MIGRATION_TIMESTAMP_FORMAT),
            name
        );
        self.files.push(PlannedFile::create(model, FileKind::Model));
        self.files.push(PlannedFile::create(migration, FileKind::Migration));
    }

    fn push_controller(&mut self) {
        let controller = format!("src/controllers/{}.rs", self.model_name);
        self.files.push(PlannedFile::create(controller, FileKind::Controller));
    }

    fn push_views(&mut self, view_types: &[String]) {
        for view in view_types {
            let path = format!("src/views/{}/{}.html.tera", self.model_name, view);
            self.files.push(PlannedFile::create(path, FileKind::View));
        }
    }
}

pub(crate) fn owned_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
