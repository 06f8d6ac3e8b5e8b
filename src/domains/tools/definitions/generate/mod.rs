//! Code generation tools for loco-rs projects.

pub mod common;
pub mod controller_view;
pub mod model;
pub mod scaffold;

pub use controller_view::{GenerateControllerViewParams, GenerateControllerViewTool};
pub use model::{GenerateModelParams, GenerateModelTool};
pub use scaffold::{GenerateScaffoldParams, GenerateScaffoldTool};
