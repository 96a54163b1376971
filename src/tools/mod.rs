mod registry;

pub use registry::{calculate_tax, ToolError, ToolRegistry};
