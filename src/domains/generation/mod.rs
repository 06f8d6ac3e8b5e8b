//! Generation domain.
//!
//! Turns validated tool arguments into a [`GenerationPlan`] and pushes that
//! plan through the [`GuardedWriter`]. Rendering file contents is left to a
//! [`FileRenderer`] supplied by the caller.

pub mod plan;
pub mod writer;

pub use plan::{DEFAULT_ACTIONS, DEFAULT_VIEW_TYPES, FileAction, FileKind, GenerationPlan, PlannedFile};
pub use writer::{FileError, FileFailure, FileRenderer, GenerationReport, GuardedWriter};
