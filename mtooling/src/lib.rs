//! Tool executor: registration, argument parsing, and time-boxed execution
//! of the searches a model asks for.

mod args;
mod error;
mod hooks;
mod registry;
mod runtime;
mod tool;
mod types;

pub mod prelude {
    pub use crate::{
        DefaultToolRuntime, JsonObject, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionResult, ToolFuture, ToolOutcome, ToolOutput, ToolRegistry, ToolRuntime,
        ToolRuntimeHooks,
    };
}

pub use args::{
    JsonObject, optional_string, parse_json_object, parse_json_value, required_string,
    string_list,
};
pub use error::{ToolError, ToolErrorKind};
pub use hooks::{NoopToolRuntimeHooks, ToolRuntimeHooks};
pub use registry::ToolRegistry;
pub use runtime::{DEFAULT_TOOL_TIMEOUT, DefaultToolRuntime, ToolRuntime};
pub use tool::{FunctionTool, Tool, ToolFuture};
pub use types::{ToolExecutionContext, ToolExecutionResult, ToolOutcome, ToolOutput, fallback_message};
