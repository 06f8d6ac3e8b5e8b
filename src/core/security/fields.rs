//! Field definition grammar: `name:type[:constraint]*`.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static FIELD_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid field name regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    I32,
    I64,
    F32,
    F64,
    Boolean,
    Datetime,
    Uuid,
    Json,
    Text,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        Self::String,
        Self::I32,
        Self::I64,
        Self::F32,
        Self::F64,
        Self::Boolean,
        Self::Datetime,
        Self::Uuid,
        Self::Json,
        Self::Text,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Uuid => "uuid",
            Self::Json => "json",
            Self::Text => "text",
        }
    }

    /// Comma separated list for diagnostics.
    pub fn supported() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or(())
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column constraint. `optional` parses to [`FieldConstraint::Nullable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldConstraint {
    Unique,
    PrimaryKey,
    Nullable,
    Default(String),
}

pub const SUPPORTED_CONSTRAINTS: &str = "unique, primary_key, nullable, optional, default:<value>";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldSpecError {
    #[error("expected 'name:type[:constraint]*', got '{0}'")]
    InvalidFormat(String),

    #[error("invalid field name '{0}': must be snake_case and start with a letter")]
    InvalidName(String),

    #[error("unsupported field type '{0}'")]
    UnsupportedType(String),

    #[error("unsupported constraint '{constraint}' for field '{field}'")]
    UnsupportedConstraint { field: String, constraint: String },

    #[error("constraint 'default' for field '{0}' needs a value")]
    MissingDefaultValue(String),

    #[error("cannot combine '{first}' and '{second}' on field '{field}'")]
    ConflictingConstraints {
        field: String,
        first: String,
        second: String,
    },
}

/// A parsed field definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub constraints: Vec<FieldConstraint>,
}

impl FieldSpec {
    pub fn is_nullable(&self) -> bool {
        self.constraints.contains(&FieldConstraint::Nullable)
    }
}

/// The name part of a field definition: everything before the first colon.
pub fn field_name(definition: &str) -> &str {
    definition.split(':').next().unwrap_or_default().trim()
}

impl FromStr for FieldSpec {
    type Err = FieldSpecError;

    fn from_str(definition: &str) -> Result<Self, Self::Err> {
        let mut parts = definition.split(':');
        let (Some(name), Some(type_name)) = (parts.next(), parts.next()) else {
            return Err(FieldSpecError::InvalidFormat(definition.to_string()));
        };

        if !FIELD_NAME_PATTERN.is_match(name) {
            return Err(FieldSpecError::InvalidName(name.to_string()));
        }

        let field_type = type_name
            .parse()
            .map_err(|_| FieldSpecError::UnsupportedType(type_name.to_string()))?;

        let mut constraints = Vec::new();
        let mut nullability: Option<&str> = None;

        while let Some(token) = parts.next() {
            let constraint = match token {
                "unique" => FieldConstraint::Unique,
                "primary_key" => FieldConstraint::PrimaryKey,
                "nullable" | "optional" => {
                    if let Some(first) = nullability {
                        return Err(FieldSpecError::ConflictingConstraints {
                            field: name.to_string(),
                            first: first.to_string(),
                            second: token.to_string(),
                        });
                    }
                    nullability = Some(token);
                    FieldConstraint::Nullable
                }
                "default" => match parts.next() {
                    Some(value) if !value.is_empty() => FieldConstraint::Default(value.to_string()),
                    _ => return Err(FieldSpecError::MissingDefaultValue(name.to_string())),
                },
                other => {
                    return Err(FieldSpecError::UnsupportedConstraint {
                        field: name.to_string(),
                        constraint: other.to_string(),
                    });
                }
            };
            constraints.push(constraint);
        }

        Ok(Self {
            name: name.to_string(),
            field_type,
            constraints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_field() {
        let spec: FieldSpec = "title:string".parse().unwrap();
        assert_eq!(spec.name, "title");
        assert_eq!(spec.field_type, FieldType::String);
        assert!(spec.constraints.is_empty());
    }

    #[test]
    fn test_parse_constraints() {
        let spec: FieldSpec = "email:string:unique:default:none".parse().unwrap();
        assert_eq!(
            spec.constraints,
            vec![FieldConstraint::Unique, FieldConstraint::Default("none".into())]
        );

        let spec: FieldSpec = "published_at:datetime:optional".parse().unwrap();
        assert!(spec.is_nullable());
    }

    #[test]
    fn test_nullable_and_optional_conflict() {
        let err = "bio:text:nullable:optional".parse::<FieldSpec>().unwrap_err();
        assert!(matches!(err, FieldSpecError::ConflictingConstraints { .. }));
    }

    #[test]
    fn test_rejects_bad_parts() {
        assert!(matches!(
            "title".parse::<FieldSpec>(),
            Err(FieldSpecError::InvalidFormat(_))
        ));
        assert!(matches!(
            "Title:string".parse::<FieldSpec>(),
            Err(FieldSpecError::InvalidName(_))
        ));
        assert!(matches!(
            "title:varchar".parse::<FieldSpec>(),
            Err(FieldSpecError::UnsupportedType(_))
        ));
        assert!(matches!(
            "title:string:indexed".parse::<FieldSpec>(),
            Err(FieldSpecError::UnsupportedConstraint { .. })
        ));
        assert!(matches!(
            "title:string:default".parse::<FieldSpec>(),
            Err(FieldSpecError::MissingDefaultValue(_))
        ));
    }

    #[test]
    fn test_field_name_takes_text_before_first_colon() {
        assert_eq!(field_name(" title :string:unique"), "title");
        assert_eq!(field_name("title"), "title");
    }

    #[test]
    fn test_supported_types_listed() {
        let listed = FieldType::supported();
        assert!(listed.starts_with("string, i32"));
        assert!(listed.ends_with("text"));
    }
}
