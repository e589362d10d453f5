//! Tool trait contract for registry-managed capabilities.
//!
//! ```rust
//! use mprovider::ToolDefinition;
//! use mtooling::{FunctionTool, Tool, ToolOutput};
//! use serde_json::Value;
//!
//! let tool = FunctionTool::new(
//!     ToolDefinition {
//!         name: "echo".to_string(),
//!         description: "Echoes input".to_string(),
//!         input_schema: r#"{"type":"object"}"#.to_string(),
//!     },
//!     |args, _ctx| async move { Ok(ToolOutput::new(Value::Object(args))) },
//! )
//! .with_source_label("the echo service");
//!
//! assert_eq!(tool.definition().name, "echo");
//! assert_eq!(tool.source_label(), "the echo service");
//! ```

use std::future::Future;
use std::sync::Arc;

use mcommon::BoxFuture;
use mprovider::ToolDefinition;

use crate::{JsonObject, ToolError, ToolExecutionContext, ToolOutput};

pub type ToolFuture<'a, T> = BoxFuture<'a, T>;

pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    /// Human-readable name of the backing service, used in fallback text.
    fn source_label(&self) -> &str;

    /// Runs the tool with already-parsed arguments.
    ///
    /// Implementations should honour `context.deadline` for outbound calls;
    /// the runtime cancels the future once the budget is spent regardless.
    fn invoke<'a>(
        &'a self,
        args: JsonObject,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolOutput, ToolError>>;
}

type ToolHandler = dyn Fn(JsonObject, ToolExecutionContext) -> ToolFuture<'static, Result<ToolOutput, ToolError>>
    + Send
    + Sync;

pub struct FunctionTool {
    definition: ToolDefinition,
    source_label: String,
    handler: Arc<ToolHandler>,
}

impl FunctionTool {
    pub fn new<F, Fut>(definition: ToolDefinition, handler: F) -> Self
    where
        F: Fn(JsonObject, ToolExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolOutput, ToolError>> + Send + 'static,
    {
        let handler: Arc<ToolHandler> =
            Arc::new(move |args, context| Box::pin(handler(args, context)));
        let source_label = definition.name.clone();

        Self {
            definition,
            source_label,
            handler,
        }
    }

    pub fn with_source_label(mut self, source_label: impl Into<String>) -> Self {
        self.source_label = source_label.into();
        self
    }
}

impl Tool for FunctionTool {
    fn definition(&self) -> ToolDefinition {
        self.definition.clone()
    }

    fn source_label(&self) -> &str {
        &self.source_label
    }

    fn invoke<'a>(
        &'a self,
        args: JsonObject,
        context: &'a ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolOutput, ToolError>> {
        (self.handler)(args, context.clone())
    }
}
