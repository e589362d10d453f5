//! Tracing-based observability hooks for provider attempts, failover, and
//! tool execution.
//!
//! ```rust
//! use mobserve::TracingObservabilityHooks;
//! use mtooling::ToolRuntimeHooks;
//!
//! fn accepts_tool_hooks(_hooks: &dyn ToolRuntimeHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_tool_hooks(&hooks);
//! ```

use std::time::Duration;

use mprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use mtooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl ProviderOperationHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "attempt_start",
            provider = %provider,
            operation,
            attempt
        );
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempt: u32) {
        tracing::info!(
            phase = "provider",
            event = "success",
            provider = %provider,
            operation,
            attempt
        );
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        error: &ProviderError,
    ) {
        tracing::warn!(
            phase = "provider",
            event = "failure",
            provider = %provider,
            operation,
            attempt,
            error_kind = error.kind.as_str(),
            retryable = error.retryable,
            error = %error
        );
    }

    fn on_failover(&self, from: ProviderId, to: ProviderId, error: &ProviderError) {
        tracing::warn!(
            phase = "failover",
            event = "next_provider",
            provider = %from,
            next_provider = %to,
            error_kind = error.kind.as_str(),
            error = %error
        );
    }
}

impl ToolRuntimeHooks for TracingObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        tracing::info!(
            phase = "tool",
            event = "execution_start",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            request_id = %context.request_id
        );
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        tracing::info!(
            phase = "tool",
            event = "execution_success",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            request_id = %context.request_id,
            sources = result.sources.len(),
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        tracing::warn!(
            phase = "tool",
            event = "execution_failure",
            tool_name = tool_call.name,
            tool_call_id = tool_call.id,
            request_id = %context.request_id,
            elapsed_ms = elapsed.as_millis() as u64,
            error_kind = error.kind.as_str(),
            error = %error
        );
    }
}
