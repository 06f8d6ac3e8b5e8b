// Security layer for generation requests.
//
// Every tool call passes through `SecurityManager::validate_operation`
// before anything is planned or written. The components underneath are
// stateless and usable on their own; only `SecurityStats` holds state.

pub mod access;
pub mod context;
pub mod error;
pub mod fields;
pub mod manager;
pub mod parameters;
pub mod path_validator;
pub mod paths;
pub mod sanitizer;
pub mod stats;

pub use access::AccessController;
pub use context::SecurityContext;
pub use error::{
    ErrorPayload, PathError, PathErrorKind, RateLimitError, SecurityError, ValidationError,
};
pub use fields::{FieldConstraint, FieldSpec, FieldType};
pub use manager::SecurityManager;
pub use parameters::{Operation, ParameterValidator};
pub use path_validator::PathValidator;
pub use paths::CanonicalPath;
pub use sanitizer::InputSanitizer;
pub use stats::{FlaggedOperation, SecurityStatistics, SecurityStats};
