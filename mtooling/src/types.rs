//! Tool runtime context and execution result types.

use mcommon::{Deadline, MetadataMap, RequestId};
use mprovider::{ToolCall, ToolResult};
use serde_json::{Value, json};

use crate::{ToolError, ToolErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecutionContext {
    pub request_id: RequestId,
    /// Outer budget for the whole request; each call is further capped by the
    /// runtime's per-call timeout.
    pub deadline: Option<Deadline>,
    pub metadata: MetadataMap,
}

impl ToolExecutionContext {
    pub fn new(request_id: impl Into<RequestId>) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: None,
            metadata: MetadataMap::new(),
        }
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// What a tool hands back on success: a JSON payload for the model and the
/// source identifiers backing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub payload: Value,
    pub sources: Vec<String>,
}

impl ToolOutput {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            sources: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolOutcome {
    Success,
    Failed(ToolErrorKind),
}

/// The answer to exactly one tool call.
///
/// A failed call still produces a result: its payload carries the error and a
/// fallback sentence the model can relay, and its sources are empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecutionResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub payload: Value,
    pub sources: Vec<String>,
    pub outcome: ToolOutcome,
}

impl ToolExecutionResult {
    pub fn success(call: &ToolCall, output: ToolOutput) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            payload: output.payload,
            sources: output.sources,
            outcome: ToolOutcome::Success,
        }
    }

    pub fn failure(call: &ToolCall, error: &ToolError, source_label: &str) -> Self {
        Self {
            tool_call_id: call.id.clone(),
            tool_name: call.name.clone(),
            payload: json!({
                "error": error.message,
                "fallback": fallback_message(source_label),
            }),
            sources: Vec::new(),
            outcome: ToolOutcome::Failed(error.kind),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Failed(_))
    }

    /// Provider-facing form; the payload is serialized as compact JSON.
    pub fn to_tool_result(&self) -> ToolResult {
        ToolResult {
            tool_call_id: self.tool_call_id.clone(),
            output: self.payload.to_string(),
        }
    }
}

pub fn fallback_message(source_label: &str) -> String {
    format!("I'm having trouble accessing {source_label} right now…")
}
