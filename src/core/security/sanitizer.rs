//! Cleans raw caller input before it reaches path or permission checks.

use std::collections::HashSet;
use std::path::{Component, Path};

use super::error::ValidationError;
use super::fields::field_name;
use super::paths::normalize_lexically;

pub const MAX_NAME_LENGTH: usize = 64;
pub const MAX_FIELD_COUNT: usize = 100;
pub const MAX_FIELD_LENGTH: usize = 500;
pub const MAX_PATH_LENGTH: usize = 1000;

/// Field names the generator reserves for itself or that collide with Rust
/// keywords in generated code.
pub const RESERVED_FIELD_NAMES: &[&str] = &["id", "type", "struct", "enum", "impl", "fn", "let", "mut"];

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSanitizer;

impl InputSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Reduce a resource name to lower-case ASCII word characters.
    pub fn sanitize_name(&self, name: &str) -> Result<String, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::new("Model name cannot be empty")
                .with_suggestion("Provide a snake_case name such as 'user_profile'"));
        }

        let length = name.chars().count();
        if length > MAX_NAME_LENGTH {
            return Err(ValidationError::new(format!(
                "Model name too long (max {} characters)",
                MAX_NAME_LENGTH
            ))
            .with_detail("length", length));
        }

        let sanitized: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match sanitized.chars().next() {
            None => Err(ValidationError::new("Model name contains invalid characters")
                .with_detail("invalid_name", name)),
            Some(first) if !first.is_ascii_alphabetic() => {
                Err(ValidationError::new("Model name must start with a letter")
                    .with_detail("invalid_name", name))
            }
            Some(_) => Ok(sanitized),
        }
    }

    /// Strip unsafe characters from each field definition and enforce
    /// unique, non-reserved names.
    pub fn sanitize_field_list(&self, fields: &[String]) -> Result<Vec<String>, ValidationError> {
        if fields.len() > MAX_FIELD_COUNT {
            return Err(ValidationError::new(format!(
                "Too many fields (max {}): {} fields provided",
                MAX_FIELD_COUNT,
                fields.len()
            )));
        }

        let mut seen = HashSet::new();
        let mut sanitized = Vec::with_capacity(fields.len());

        for (index, field) in fields.iter().enumerate() {
            let position = index + 1;
            if field.trim().is_empty() {
                return Err(ValidationError::new(format!("Field {} cannot be empty", position))
                    .with_detail("index", index));
            }
            if field.chars().count() > MAX_FIELD_LENGTH {
                return Err(ValidationError::new(format!(
                    "Field {} definition too long (max {} characters)",
                    position, MAX_FIELD_LENGTH
                ))
                .with_detail("index", index));
            }

            let cleaned = strip_unsafe_chars(field.trim());
            if !cleaned.contains(':') {
                return Err(ValidationError::new(format!(
                    "Field {} format invalid: '{}'",
                    position, field
                ))
                .with_detail("invalid_field", field.as_str())
                .with_suggestion("Use the form 'name:type', e.g. 'title:string'"));
            }

            let name = field_name(&cleaned).to_string();
            if !seen.insert(name.clone()) {
                return Err(ValidationError::new(format!("Duplicate field name: '{}'", name))
                    .with_detail("duplicate_field", name.as_str())
                    .with_suggestion(format!("Remove or rename duplicate field: {}", name)));
            }
            if RESERVED_FIELD_NAMES.contains(&name.as_str()) {
                return Err(ValidationError::new(format!("Field name '{}' is reserved", name))
                    .with_detail("reserved_field", name.as_str())
                    .with_suggestion("Use a different field name"));
            }

            sanitized.push(cleaned);
        }

        Ok(sanitized)
    }

    /// Normalize a project path into an absolute, dot-free form.
    ///
    /// Relative input is resolved against `cwd`. The result is stable under a
    /// second application.
    pub fn sanitize_path(&self, path: &str, cwd: &Path) -> Result<String, ValidationError> {
        if path.is_empty() {
            return Err(ValidationError::new("Project path cannot be empty"));
        }
        if path.chars().count() > MAX_PATH_LENGTH {
            return Err(ValidationError::new(format!(
                "Project path too long (max {} characters)",
                MAX_PATH_LENGTH
            )));
        }

        let normalized = normalize_lexically(Path::new(path));
        let absolute = if normalized.is_absolute() {
            normalized
        } else {
            normalize_lexically(&cwd.join(normalized))
        };

        let text = absolute.to_string_lossy();
        let mut cleaned = strip_unsafe_chars(&text);
        // Stripping can splice new dot segments together ("a/.\u{0}./b").
        if cleaned != text {
            cleaned = normalize_lexically(Path::new(&cleaned))
                .to_string_lossy()
                .into_owned();
        }

        let traversal = cleaned.contains("../") || cleaned.ends_with("/..");
        let home = Path::new(&cleaned).components().any(|c| match c {
            Component::Normal(segment) => segment.to_string_lossy().starts_with('~'),
            _ => false,
        });
        if traversal || home {
            return Err(ValidationError::new("Invalid project path pattern detected")
                .with_detail("project_path", path)
                .with_suggestion("Use a path inside the project without '..' or '~'"));
        }

        Ok(cleaned)
    }
}

/// Drop quotes, angle brackets and C0/C1 control characters.
fn strip_unsafe_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '"' | '\'' | '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}'))
        .collect()
}
