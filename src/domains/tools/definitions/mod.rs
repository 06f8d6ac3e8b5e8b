//! Tool definitions module.
//!
//! Each tool is defined in its own file and knows how to build its own
//! route.

pub mod generate;
pub mod security_stats;

pub use generate::{
    GenerateControllerViewParams, GenerateControllerViewTool, GenerateModelParams,
    GenerateModelTool, GenerateScaffoldParams, GenerateScaffoldTool,
};
pub use security_stats::{SecurityStatsParams, SecurityStatsTool};
