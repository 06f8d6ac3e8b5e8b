//! Declarative, rule-based validation of tool arguments.
//!
//! Each operation owns a static list of [`ValidationRule`]s plus a list of
//! cross-parameter checks. Validation stops at the first violation.

use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};

use super::error::ValidationError;
use super::fields::{FieldSpec, FieldSpecError, FieldType, SUPPORTED_CONSTRAINTS, field_name};
use super::paths::normalize_lexically;

static MODEL_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]{1,63}$").expect("valid model name regex"));

pub const RESERVED_KEYWORDS: &[&str] = &[
    "id", "type", "struct", "enum", "impl", "fn", "let", "mut", "if", "else", "for", "while",
    "loop", "match", "break", "continue", "return", "async", "await", "mod", "use", "pub",
    "trait",
];

pub const VALID_ACTIONS: &[&str] = &["create", "delete", "edit", "index", "new", "show", "update"];
pub const VALID_VIEW_TYPES: &[&str] = &["edit", "form", "list", "new", "show"];

/// The operations that pass through parameter validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GenerateModel,
    GenerateScaffold,
    GenerateControllerView,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Self::GenerateModel,
        Self::GenerateScaffold,
        Self::GenerateControllerView,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateModel => "generate_model",
            Self::GenerateScaffold => "generate_scaffold",
            Self::GenerateControllerView => "generate_controller_view",
        }
    }

    pub fn rules(self) -> &'static [ValidationRule] {
        match self {
            Self::GenerateModel => MODEL_RULES,
            Self::GenerateScaffold => SCAFFOLD_RULES,
            Self::GenerateControllerView => CONTROLLER_VIEW_RULES,
        }
    }

    fn cross_checks(self) -> &'static [CrossCheck] {
        match self {
            Self::GenerateScaffold => SCAFFOLD_CROSS_CHECKS,
            Self::GenerateModel | Self::GenerateControllerView => &[],
        }
    }
}

impl FromStr for Operation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|op| op.as_str() == s).ok_or_else(|| {
            ValidationError::new(format!("Unknown operation: '{}'", s))
                .with_detail("operation", s)
                .with_detail(
                    "supported_operations",
                    json!(Self::ALL.map(Operation::as_str)),
                )
        })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by a rule predicate, before it is tied to a parameter.
#[derive(Debug, Clone, Default)]
pub struct RuleViolation {
    pub message: String,
    pub details: Map<String, Value>,
    pub suggestions: Vec<String>,
}

impl RuleViolation {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

type Predicate = fn(&Value) -> Result<(), RuleViolation>;
type CrossCheck = fn(&Map<String, Value>) -> Result<(), ValidationError>;

/// One named check bound to one parameter.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRule {
    pub name: &'static str,
    pub required: bool,
    pub predicate: Predicate,
    pub description: &'static str,
}

const PROJECT_PATH_RULE: ValidationRule = ValidationRule {
    name: "project_path",
    required: false,
    predicate: validate_project_path,
    description: "Path to the loco-rs project directory",
};

static MODEL_RULES: &[ValidationRule] = &[
    ValidationRule {
        name: "model_name",
        required: true,
        predicate: validate_model_name,
        description: "Model name in snake_case (e.g., 'user_profile')",
    },
    ValidationRule {
        name: "fields",
        required: true,
        predicate: validate_field_list,
        description: "List of field definitions (e.g., ['name:string', 'email:string:unique'])",
    },
    PROJECT_PATH_RULE,
];

static SCAFFOLD_RULES: &[ValidationRule] = &[
    ValidationRule {
        name: "model_name",
        required: true,
        predicate: validate_model_name,
        description: "Model name in snake_case",
    },
    ValidationRule {
        name: "fields",
        required: true,
        predicate: validate_field_list,
        description: "List of field definitions",
    },
    ValidationRule {
        name: "include_views",
        required: false,
        predicate: validate_boolean,
        description: "Whether to generate view templates",
    },
    ValidationRule {
        name: "include_controllers",
        required: false,
        predicate: validate_boolean,
        description: "Whether to generate controllers",
    },
    ValidationRule {
        name: "api_only",
        required: false,
        predicate: validate_boolean,
        description: "Generate API-only scaffolding (no views)",
    },
    PROJECT_PATH_RULE,
];

static CONTROLLER_VIEW_RULES: &[ValidationRule] = &[
    ValidationRule {
        name: "model_name",
        required: true,
        predicate: validate_model_name,
        description: "Name of an existing model",
    },
    ValidationRule {
        name: "actions",
        required: false,
        predicate: validate_controller_actions,
        description: "List of controller actions to generate",
    },
    ValidationRule {
        name: "view_types",
        required: false,
        predicate: validate_view_types,
        description: "Types of views to generate",
    },
    PROJECT_PATH_RULE,
];

static SCAFFOLD_CROSS_CHECKS: &[CrossCheck] = &[check_api_only_views, check_controllers_enabled];

#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterValidator;

impl ParameterValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the raw arguments of `operation`.
    ///
    /// A JSON `null` counts as absent.
    pub fn validate(&self, operation: &str, params: &Map<String, Value>) -> Result<(), ValidationError> {
        let operation: Operation = operation.parse()?;
        let rules = operation.rules();

        let expected: Vec<&str> = rules.iter().map(|r| r.name).collect();
        let mut unexpected: Vec<&str> = params
            .keys()
            .map(String::as_str)
            .filter(|key| !expected.contains(key))
            .collect();
        if !unexpected.is_empty() {
            unexpected.sort_unstable();
            let mut err = ValidationError::new(format!(
                "Unexpected parameter(s) for {}: {}",
                operation,
                unexpected.join(", ")
            ))
            .with_detail("unexpected_parameters", json!(unexpected))
            .with_detail("expected_parameters", json!(expected));
            for key in &unexpected {
                err = err.with_suggestion(format!("Remove unexpected parameter: {}", key));
            }
            return Err(err);
        }

        for rule in rules {
            match params.get(rule.name).filter(|v| !v.is_null()) {
                None if rule.required => {
                    return Err(ValidationError::new(format!(
                        "Required parameter '{}' is missing for {}",
                        rule.name, operation
                    ))
                    .with_detail("missing_parameter", rule.name)
                    .with_suggestion(format!("Add parameter '{}': {}", rule.name, rule.description)));
                }
                None => {}
                Some(value) => {
                    (rule.predicate)(value).map_err(|violation| wrap_violation(rule, value, violation))?
                }
            }
        }

        for check in operation.cross_checks() {
            check(params)?;
        }

        Ok(())
    }
}

fn wrap_violation(rule: &ValidationRule, value: &Value, violation: RuleViolation) -> ValidationError {
    let mut err = ValidationError::new(format!(
        "Invalid value for parameter '{}': {}",
        rule.name, violation.message
    ))
    .with_detail("parameter", rule.name)
    .with_detail("invalid_value", value.clone());
    err.details.extend(violation.details);
    err.suggestions.extend(violation.suggestions);
    err.with_suggestion(format!("Fix parameter '{}': {}", rule.name, rule.description))
}

fn validate_model_name(value: &Value) -> Result<(), RuleViolation> {
    let name = value
        .as_str()
        .ok_or_else(|| RuleViolation::new("Model name must be a string"))?;

    if name.is_empty() {
        return Err(RuleViolation::new("Model name cannot be empty"));
    }
    if !MODEL_NAME_PATTERN.is_match(name) {
        return Err(RuleViolation::new(format!(
            "Invalid model name: '{}'. Must be snake_case, start with a letter, 2 to 64 characters",
            name
        ))
        .with_detail("invalid_name", name));
    }
    if RESERVED_KEYWORDS.contains(&name) {
        return Err(RuleViolation::new(format!("Model name '{}' is a reserved keyword", name))
            .with_detail("reserved_keyword", name)
            .with_suggestion(format!("Use alternative name: {}_model", name))
            .with_suggestion(format!("Use alternative name: {}_entity", name)));
    }
    Ok(())
}

fn validate_field_list(value: &Value) -> Result<(), RuleViolation> {
    let fields = value
        .as_array()
        .ok_or_else(|| RuleViolation::new("Fields must be a list"))?;
    if fields.is_empty() {
        return Err(RuleViolation::new("At least one field must be specified"));
    }

    let mut names = HashSet::new();
    for (index, field) in fields.iter().enumerate() {
        let field = field.as_str().ok_or_else(|| {
            RuleViolation::new(format!("Field definition at index {} must be a string", index))
        })?;
        let field = field.trim();
        if field.is_empty() {
            return Err(RuleViolation::new(format!(
                "Field definition at index {} cannot be empty",
                index
            )));
        }

        if let Err(e) = field.parse::<FieldSpec>() {
            return Err(field_format_violation(field, index, e));
        }

        let name = field_name(field);
        if !names.insert(name) {
            return Err(RuleViolation::new(format!(
                "Duplicate field name: '{}'. Each field name must be unique",
                name
            ))
            .with_detail("duplicate_field", name)
            .with_suggestion(format!("Remove or rename duplicate field: {}", name)));
        }
        if name == "id" {
            return Err(RuleViolation::new("Field name 'id' is reserved for the primary key")
                .with_detail("reserved_field", "id")
                .with_suggestion("Use a different field name")
                .with_suggestion("Let the generator handle the 'id' field automatically"));
        }
    }
    Ok(())
}

fn field_format_violation(field: &str, index: usize, error: FieldSpecError) -> RuleViolation {
    let violation = RuleViolation::new(format!(
        "Invalid field format: '{}' ({}). Expected format: 'name:type[:constraint]*'",
        field, error
    ))
    .with_detail("invalid_field", field)
    .with_detail("index", index)
    .with_detail("expected_format", "name:type[:constraint]")
    .with_detail(
        "examples",
        json!(["name:string", "email:string:unique", "price:i32", "published_at:datetime:nullable"]),
    );

    match error {
        FieldSpecError::ConflictingConstraints { .. } => violation
            .with_suggestion("Use either 'nullable' or 'optional' (they are equivalent)"),
        _ => violation
            .with_suggestion("Check field format")
            .with_suggestion(format!("Supported types: {}", FieldType::supported()))
            .with_suggestion(format!("Supported constraints: {}", SUPPORTED_CONSTRAINTS)),
    }
}

fn validate_boolean(value: &Value) -> Result<(), RuleViolation> {
    if value.is_boolean() {
        Ok(())
    } else {
        Err(RuleViolation::new("Parameter must be a boolean (true or false)"))
    }
}

fn validate_choice_list(
    value: &Value,
    what: &str,
    detail_key: &str,
    valid: &[&str],
) -> Result<(), RuleViolation> {
    let items = value
        .as_array()
        .ok_or_else(|| RuleViolation::new(format!("{} must be a list", what)))?;

    for item in items {
        let item = item
            .as_str()
            .ok_or_else(|| RuleViolation::new(format!("Each entry of {} must be a string", what)))?;
        if !valid.contains(&item) {
            return Err(RuleViolation::new(format!("Invalid {}: '{}'", detail_key, item))
                .with_detail(detail_key, item)
                .with_detail("valid_values", json!(valid))
                .with_suggestion(format!("Use one of: {}", valid.join(", "))));
        }
    }
    Ok(())
}

fn validate_controller_actions(value: &Value) -> Result<(), RuleViolation> {
    validate_choice_list(value, "Actions", "action", VALID_ACTIONS)
}

fn validate_view_types(value: &Value) -> Result<(), RuleViolation> {
    validate_choice_list(value, "View types", "view_type", VALID_VIEW_TYPES)
}

fn validate_project_path(value: &Value) -> Result<(), RuleViolation> {
    let path = value
        .as_str()
        .ok_or_else(|| RuleViolation::new("Project path must be a string"))?;
    if path.trim().is_empty() {
        return Err(RuleViolation::new("Project path cannot be empty"));
    }

    let normalized = normalize_lexically(Path::new(path));
    if matches!(normalized.components().next(), Some(Component::ParentDir)) {
        return Err(RuleViolation::new("Project path cannot reference parent directories"));
    }

    let text = normalized.to_string_lossy();
    if text.contains('~') && !text.starts_with('~') {
        return Err(RuleViolation::new("Invalid tilde usage in project path"));
    }
    Ok(())
}

fn flag(params: &Map<String, Value>, key: &str) -> Option<bool> {
    params.get(key).and_then(Value::as_bool)
}

fn check_api_only_views(params: &Map<String, Value>) -> Result<(), ValidationError> {
    let api_only = flag(params, "api_only").unwrap_or(false);
    let include_views = flag(params, "include_views").unwrap_or(true);

    if api_only && include_views {
        return Err(
            ValidationError::new("Cannot have both api_only=true and include_views=true")
                .with_detail("api_only", api_only)
                .with_detail("include_views", include_views)
                .with_suggestion("Set api_only=false for full scaffolding")
                .with_suggestion("Set include_views=false for API-only scaffolding"),
        );
    }
    Ok(())
}

fn check_controllers_enabled(params: &Map<String, Value>) -> Result<(), ValidationError> {
    if flag(params, "include_controllers") == Some(false) {
        return Err(ValidationError::new("include_controllers=false is not supported yet")
            .with_detail("include_controllers", false)
            .with_suggestion("Set include_controllers=true (default)"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn validate(op: &str, value: Value) -> Result<(), ValidationError> {
        ParameterValidator::new().validate(op, &params(value))
    }

    #[test]
    fn test_valid_model_params() {
        let result = validate(
            "generate_model",
            json!({"model_name": "post", "fields": ["title:string", "body:text:nullable"]}),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_unknown_operation() {
        let err = validate("drop_database", json!({})).unwrap_err();
        assert!(err.message.contains("Unknown operation"));
    }

    #[test]
    fn test_unexpected_parameter_is_rejected() {
        let err = validate(
            "generate_model",
            json!({"model_name": "post", "fields": ["title:string"], "force": true}),
        )
        .unwrap_err();
        assert!(err.message.contains("Unexpected parameter"));
        assert_eq!(err.details["unexpected_parameters"], json!(["force"]));
        assert_eq!(err.suggestions, vec!["Remove unexpected parameter: force".to_string()]);
    }

    #[test]
    fn test_missing_required_parameter() {
        let err = validate("generate_model", json!({"model_name": "post"})).unwrap_err();
        assert!(err.message.contains("'fields'"));
        assert_eq!(err.details["missing_parameter"], "fields");
        assert!(err.suggestions[0].contains("List of field definitions"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err =
            validate("generate_model", json!({"model_name": null, "fields": ["a:string"]}))
                .unwrap_err();
        assert_eq!(err.details["missing_parameter"], "model_name");
    }

    #[test]
    fn test_predicate_failure_is_wrapped() {
        let err = validate(
            "generate_model",
            json!({"model_name": "Post", "fields": ["title:string"]}),
        )
        .unwrap_err();
        assert_eq!(err.details["parameter"], "model_name");
        assert_eq!(err.details["invalid_value"], "Post");
        assert!(
            err.suggestions
                .iter()
                .any(|s| s.starts_with("Fix parameter 'model_name'"))
        );
    }

    #[test]
    fn test_reserved_model_name() {
        let err = validate("generate_model", json!({"model_name": "match", "fields": ["a:string"]}))
            .unwrap_err();
        assert!(err.message.contains("reserved keyword"));
        assert!(err.suggestions.contains(&"Use alternative name: match_model".to_string()));
    }

    #[test]
    fn test_field_grammar_violations() {
        for field in ["title", "title:varchar", "Title:string", "bio:text:nullable:optional"] {
            let err = validate("generate_model", json!({"model_name": "post", "fields": [field]}))
                .unwrap_err();
            assert_eq!(err.details["parameter"], "fields", "{field}");
        }
    }

    #[test]
    fn test_duplicate_and_reserved_fields() {
        let err = validate(
            "generate_model",
            json!({"model_name": "post", "fields": ["name:string", "name:string"]}),
        )
        .unwrap_err();
        assert_eq!(err.details["duplicate_field"], "name");

        let err = validate("generate_model", json!({"model_name": "post", "fields": ["id:string"]}))
            .unwrap_err();
        assert_eq!(err.details["reserved_field"], "id");
    }

    #[test]
    fn test_empty_field_list() {
        let err = validate("generate_model", json!({"model_name": "post", "fields": []}))
            .unwrap_err();
        assert!(err.message.contains("At least one field"));
    }

    #[test]
    fn test_scaffold_api_only_conflicts_with_views() {
        let err = validate(
            "generate_scaffold",
            json!({
                "model_name": "post",
                "fields": ["title:string"],
                "api_only": true,
                "include_views": true
            }),
        )
        .unwrap_err();
        assert!(err.message.contains("api_only"));
        assert!(err.message.contains("include_views"));
    }

    #[test]
    fn test_scaffold_api_only_needs_views_disabled() {
        // Views default to on, so api_only alone conflicts.
        let err = validate(
            "generate_scaffold",
            json!({"model_name": "post", "fields": ["title:string"], "api_only": true}),
        )
        .unwrap_err();
        assert!(err.message.contains("api_only=true and include_views=true"));
        assert_eq!(err.details["include_views"], true);

        let result = validate(
            "generate_scaffold",
            json!({
                "model_name": "post",
                "fields": ["title:string"],
                "api_only": true,
                "include_views": false
            }),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_scaffold_without_controllers_rejected() {
        let err = validate(
            "generate_scaffold",
            json!({"model_name": "post", "fields": ["title:string"], "include_controllers": false}),
        )
        .unwrap_err();
        assert!(err.message.contains("include_controllers=false"));
    }

    #[test]
    fn test_scaffold_boolean_type_checked() {
        let err = validate(
            "generate_scaffold",
            json!({"model_name": "post", "fields": ["title:string"], "api_only": "yes"}),
        )
        .unwrap_err();
        assert_eq!(err.details["parameter"], "api_only");
    }

    #[test]
    fn test_controller_view_choices() {
        assert!(
            validate(
                "generate_controller_view",
                json!({"model_name": "post", "actions": ["index", "show"], "view_types": ["list"]}),
            )
            .is_ok()
        );

        let err = validate(
            "generate_controller_view",
            json!({"model_name": "post", "actions": ["index", "destroy"]}),
        )
        .unwrap_err();
        assert_eq!(err.details["action"], "destroy");

        let err = validate(
            "generate_controller_view",
            json!({"model_name": "post", "view_types": ["grid"]}),
        )
        .unwrap_err();
        assert_eq!(err.details["view_type"], "grid");
    }

    #[test]
    fn test_project_path_rules() {
        let base = json!({"model_name": "post", "fields": ["a:string"]});
        let with_path = |path: &str| {
            let mut p = params(base.clone());
            p.insert("project_path".into(), json!(path));
            ParameterValidator::new().validate("generate_model", &p)
        };

        assert!(with_path("/srv/app").is_ok());
        assert!(with_path("app").is_ok());
        assert!(with_path("../app").is_err());
        assert!(with_path("  ").is_err());
        assert!(with_path("/srv/~app").is_err());
    }

    #[test]
    fn test_rule_tables_declare_project_path_everywhere() {
        for op in Operation::ALL {
            assert!(op.rules().iter().any(|r| r.name == "project_path" && !r.required));
            assert!(op.rules().iter().any(|r| r.name == "model_name" && r.required));
        }
    }
}
