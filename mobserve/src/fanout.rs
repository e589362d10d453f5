//! Combined tracing and metrics hooks behind panic guards.

use std::time::Duration;

use mprovider::{ProviderError, ProviderId, ProviderOperationHooks, ToolCall};
use mtooling::{ToolError, ToolExecutionContext, ToolExecutionResult, ToolRuntimeHooks};

use crate::{MetricsObservabilityHooks, SafeProviderHooks, SafeToolHooks, TracingObservabilityHooks};

/// Logs and records every event; a panicking sink never reaches the caller.
#[derive(Default)]
pub struct ObservabilityHooks {
    tracing: SafeProviderHooks<TracingObservabilityHooks>,
    metrics: SafeProviderHooks<MetricsObservabilityHooks>,
    tool_tracing: SafeToolHooks<TracingObservabilityHooks>,
    tool_metrics: SafeToolHooks<MetricsObservabilityHooks>,
}

impl ObservabilityHooks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProviderOperationHooks for ObservabilityHooks {
    fn on_attempt_start(&self, provider: ProviderId, operation: &str, attempt: u32) {
        self.tracing.on_attempt_start(provider, operation, attempt);
        self.metrics.on_attempt_start(provider, operation, attempt);
    }

    fn on_success(&self, provider: ProviderId, operation: &str, attempt: u32) {
        self.tracing.on_success(provider, operation, attempt);
        self.metrics.on_success(provider, operation, attempt);
    }

    fn on_failure(
        &self,
        provider: ProviderId,
        operation: &str,
        attempt: u32,
        error: &ProviderError,
    ) {
        self.tracing.on_failure(provider, operation, attempt, error);
        self.metrics.on_failure(provider, operation, attempt, error);
    }

    fn on_failover(&self, from: ProviderId, to: ProviderId, error: &ProviderError) {
        self.tracing.on_failover(from, to, error);
        self.metrics.on_failover(from, to, error);
    }
}

impl ToolRuntimeHooks for ObservabilityHooks {
    fn on_execution_start(&self, tool_call: &ToolCall, context: &ToolExecutionContext) {
        self.tool_tracing.on_execution_start(tool_call, context);
        self.tool_metrics.on_execution_start(tool_call, context);
    }

    fn on_execution_success(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        result: &ToolExecutionResult,
        elapsed: Duration,
    ) {
        self.tool_tracing
            .on_execution_success(tool_call, context, result, elapsed);
        self.tool_metrics
            .on_execution_success(tool_call, context, result, elapsed);
    }

    fn on_execution_failure(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
        error: &ToolError,
        elapsed: Duration,
    ) {
        self.tool_tracing
            .on_execution_failure(tool_call, context, error, elapsed);
        self.tool_metrics
            .on_execution_failure(tool_call, context, error, elapsed);
    }
}
