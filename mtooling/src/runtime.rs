//! Tool runtime trait and default registry-backed executor.
//!
//! Every call finishes within its time budget and always yields a
//! [`ToolExecutionResult`]; failures become error-shaped results instead of
//! errors so one broken search never aborts a conversation turn.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{Either, join_all, select};
use mcommon::Deadline;
use mprovider::{ToolCall, ToolDefinition};

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolExecutionResult, ToolFuture,
    ToolRegistry, ToolRuntimeHooks, parse_json_object,
};

pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(15);

pub trait ToolRuntime: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult>;

    /// Runs every call of one turn concurrently; results keep call order.
    fn execute_all<'a>(
        &'a self,
        tool_calls: Vec<ToolCall>,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Vec<ToolExecutionResult>> {
        Box::pin(async move {
            join_all(
                tool_calls
                    .into_iter()
                    .map(|tool_call| self.execute(tool_call, context.clone())),
            )
            .await
        })
    }
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Duration,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn call_deadline(&self, context: &ToolExecutionContext) -> Deadline {
        match context.deadline {
            Some(outer) => outer.tighten(self.timeout),
            None => Deadline::after(self.timeout),
        }
    }

    async fn run(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<ToolExecutionResult, (ToolError, String)> {
        let Some(tool) = self.registry.get(&tool_call.name) else {
            let error = ToolError::not_found(format!("tool '{}' is not registered", tool_call.name));
            return Err((error, tool_call.name.clone()));
        };
        let label = tool.source_label().to_string();

        let args = parse_json_object(&tool_call.arguments).map_err(|error| (error, label.clone()))?;

        let deadline = self.call_deadline(context);
        let call_context = context.clone().with_deadline(deadline);
        let invocation = tool.invoke(args, &call_context);
        let expiry = Delay::new(deadline.remaining());

        match select(invocation, expiry).await {
            Either::Left((Ok(output), _)) => Ok(ToolExecutionResult::success(tool_call, output)),
            Either::Left((Err(error), _)) => Err((error, label)),
            Either::Right(((), _)) => Err((
                ToolError::timeout(format!(
                    "tool '{}' exceeded its time budget of {:?}",
                    tool_call.name, self.timeout
                )),
                label,
            )),
        }
    }
}

impl std::fmt::Debug for DefaultToolRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultToolRuntime")
            .field("registry", &self.registry)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult> {
        Box::pin(async move {
            self.hooks.on_execution_start(&tool_call, &context);
            let started = Instant::now();

            match self.run(&tool_call, &context).await {
                Ok(result) => {
                    self.hooks
                        .on_execution_success(&tool_call, &context, &result, started.elapsed());
                    result
                }
                Err((error, label)) => {
                    let error = error
                        .with_tool_name(tool_call.name.clone())
                        .with_tool_call_id(tool_call.id.clone());
                    self.hooks
                        .on_execution_failure(&tool_call, &context, &error, started.elapsed());
                    ToolExecutionResult::failure(&tool_call, &error, &label)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::{JsonObject, ToolErrorKind, ToolOutcome, ToolOutput, required_string};

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: format!("{name} tool"),
            input_schema: "{\"type\":\"object\"}".to_string(),
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_fn(definition("echo"), |args: JsonObject, ctx| async move {
            let query = required_string(&args, "query")?;
            Ok::<_, ToolError>(
                ToolOutput::new(json!({ "query": query, "request": ctx.request_id.as_str() }))
                    .with_sources(vec![format!("echo:{query}")]),
            )
        });
        registry.register_fn(definition("slow"), |_args, _ctx| async move {
            Delay::new(Duration::from_secs(5)).await;
            Ok::<_, ToolError>(ToolOutput::new(json!({})))
        });
        registry.register_fn(definition("broken"), |_args, _ctx| async move {
            Err::<ToolOutput, _>(ToolError::unavailable("upstream returned 503"))
        });
        registry
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", tool_call.id));
        }

        fn on_execution_success(
            &self,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            _result: &ToolExecutionResult,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{}", tool_call.id));
        }

        fn on_execution_failure(
            &self,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{}:{}", tool_call.id, error.kind.as_str()));
        }
    }

    #[tokio::test]
    async fn runtime_executes_registered_tool() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));

        let result = runtime
            .execute(
                call("call_1", "echo", r#"{"query":"ramen"}"#),
                ToolExecutionContext::new("req-1"),
            )
            .await;

        assert_eq!(result.outcome, ToolOutcome::Success);
        assert_eq!(result.payload, json!({"query": "ramen", "request": "req-1"}));
        assert_eq!(result.sources, vec!["echo:ramen".to_string()]);
    }

    #[tokio::test]
    async fn unknown_tool_and_bad_arguments_become_error_results() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));
        let context = ToolExecutionContext::new("req-2");

        let unknown = runtime
            .execute(call("call_2", "search_menus", "{}"), context.clone())
            .await;
        assert_eq!(unknown.outcome, ToolOutcome::Failed(ToolErrorKind::NotFound));
        assert_eq!(unknown.tool_call_id, "call_2");
        assert!(unknown.payload["fallback"]
            .as_str()
            .expect("fallback text")
            .contains("search_menus"));

        let malformed = runtime
            .execute(call("call_3", "echo", "{\"query\":"), context.clone())
            .await;
        assert_eq!(
            malformed.outcome,
            ToolOutcome::Failed(ToolErrorKind::InvalidArguments)
        );
        assert!(malformed.sources.is_empty());

        let missing_query = runtime.execute(call("call_4", "echo", "{}"), context).await;
        assert!(missing_query.is_error());
    }

    #[tokio::test]
    async fn slow_tool_is_cut_off_at_the_budget() {
        let runtime =
            DefaultToolRuntime::new(Arc::new(registry())).with_timeout(Duration::from_millis(50));

        let started = Instant::now();
        let result = runtime
            .execute(call("call_5", "slow", "{}"), ToolExecutionContext::new("req-3"))
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(result.outcome, ToolOutcome::Failed(ToolErrorKind::Timeout));
        assert_eq!(
            result.payload["fallback"],
            "I'm having trouble accessing slow right now…"
        );
    }

    #[tokio::test]
    async fn outer_deadline_tightens_the_per_call_budget() {
        let runtime = DefaultToolRuntime::new(Arc::new(registry()));
        let context =
            ToolExecutionContext::new("req-4").with_deadline(Deadline::after(Duration::from_millis(50)));

        let started = Instant::now();
        let result = runtime.execute(call("call_6", "slow", "{}"), context).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(result.is_error());
    }

    #[tokio::test]
    async fn execute_all_isolates_failures_and_preserves_order() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = DefaultToolRuntime::new(Arc::new(registry()))
            .with_timeout(Duration::from_millis(50))
            .with_hooks(hooks.clone());

        let results = runtime
            .execute_all(
                vec![
                    call("a", "slow", "{}"),
                    call("b", "echo", r#"{"query":"tacos"}"#),
                    call("c", "broken", "{}"),
                ],
                ToolExecutionContext::new("req-5"),
            )
            .await;

        let ids = results
            .iter()
            .map(|result| result.tool_call_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(results[0].is_error());
        assert_eq!(results[1].outcome, ToolOutcome::Success);
        assert_eq!(results[2].payload["error"], "upstream returned 503");

        let events = hooks.events.lock().expect("events lock").clone();
        assert!(events.contains(&"failure:a:timeout".to_string()));
        assert!(events.contains(&"success:b".to_string()));
        assert!(events.contains(&"failure:c:unavailable".to_string()));
    }

    #[test]
    fn registry_tracks_registered_tools_in_name_order() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["broken", "echo", "slow"]);
        assert!(registry.contains("echo"));

        let runtime = DefaultToolRuntime::new(Arc::new(registry));
        assert_eq!(runtime.definitions().len(), 3);
        assert_eq!(runtime.timeout(), DEFAULT_TOOL_TIMEOUT);
    }
}
