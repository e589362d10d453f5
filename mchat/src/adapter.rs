//! Provider turn adapters.
//!
//! A turn is at most two provider calls: `begin_turn` asks the model for an
//! answer or for searches, and `finish_turn` feeds the search results back
//! for a final synthesis. Backends with function calling use
//! [`NativeToolAdapter`]; text-only backends use [`PromptProtocolAdapter`]
//! and the `SEARCH_NEEDED` convention from [`crate::protocol`].

use std::sync::Arc;
use std::time::Duration;

use mcommon::{BoxFuture, Deadline, GenerationOptions, RequestId};
use mprovider::{
    Message, ModelRequest, ModelRequestBuilder, ProviderError, ProviderId,
    ProviderOperationHooks, RegisteredProvider, Role, ToolDefinition, execute_observed,
};
use mtooling::ToolExecutionResult;

use crate::FirstResponse;
use crate::prompt::FINAL_ANSWER_APOLOGY;
use crate::protocol::{parse_completion, protocol_instructions};

const BEGIN_TURN: &str = "begin_turn";
const FINISH_TURN: &str = "finish_turn";

/// Per-attempt identity handed to both halves of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    pub request_id: RequestId,
    /// Position of this provider in the failover chain, starting at 1.
    pub attempt: u32,
}

pub trait TurnAdapter: Send + Sync {
    fn provider_id(&self) -> ProviderId;

    fn begin_turn<'a>(
        &'a self,
        conversation: &'a [Message],
        turn: &'a TurnContext,
    ) -> BoxFuture<'a, Result<FirstResponse, ProviderError>>;

    /// Never fails: a backend error yields [`FINAL_ANSWER_APOLOGY`].
    fn finish_turn<'a>(
        &'a self,
        conversation: &'a [Message],
        first: &'a FirstResponse,
        results: &'a [ToolExecutionResult],
        turn: &'a TurnContext,
    ) -> BoxFuture<'a, String>;
}

/// Settings shared by both adapter flavours for one request.
#[derive(Clone)]
pub struct AdapterSettings {
    pub model: String,
    pub options: GenerationOptions,
    pub tools: Vec<ToolDefinition>,
    /// Budget for each individual provider call.
    pub call_timeout: Duration,
    pub hooks: Arc<dyn ProviderOperationHooks>,
}

impl std::fmt::Debug for AdapterSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterSettings")
            .field("model", &self.model)
            .field("options", &self.options)
            .field("tools", &self.tools.len())
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl AdapterSettings {
    fn request(&self, messages: Vec<Message>, turn: &TurnContext) -> ModelRequestBuilder {
        ModelRequest::builder(self.model.clone())
            .messages(messages)
            .options(self.options)
            .metadata("request_id", turn.request_id.as_str())
            .deadline(Deadline::after(self.call_timeout))
    }
}

/// Picks the adapter matching the backend's tool protocol.
pub fn adapter_for(entry: &RegisteredProvider, settings: AdapterSettings) -> Box<dyn TurnAdapter> {
    let provider = Arc::clone(&entry.provider);
    if provider.supports_native_tools() {
        Box::new(NativeToolAdapter::new(provider, settings))
    } else {
        Box::new(PromptProtocolAdapter::new(provider, settings))
    }
}

fn non_empty(first: FirstResponse) -> Result<FirstResponse, ProviderError> {
    if first.is_empty() {
        return Err(ProviderError::other("provider returned an empty response"));
    }

    Ok(first)
}

/// The final answer, or the apology when the call failed or said nothing.
fn final_text(result: Result<String, ProviderError>) -> String {
    match result {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => FINAL_ANSWER_APOLOGY.to_string(),
    }
}

pub struct NativeToolAdapter {
    provider: Arc<dyn mprovider::ModelProvider>,
    settings: AdapterSettings,
}

impl NativeToolAdapter {
    pub fn new(provider: Arc<dyn mprovider::ModelProvider>, settings: AdapterSettings) -> Self {
        Self { provider, settings }
    }
}

impl TurnAdapter for NativeToolAdapter {
    fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    fn begin_turn<'a>(
        &'a self,
        conversation: &'a [Message],
        turn: &'a TurnContext,
    ) -> BoxFuture<'a, Result<FirstResponse, ProviderError>> {
        Box::pin(async move {
            execute_observed(
                self.provider_id(),
                BEGIN_TURN,
                turn.attempt,
                self.settings.hooks.as_ref(),
                async {
                    let request = self
                        .settings
                        .request(conversation.to_vec(), turn)
                        .tools(self.settings.tools.clone())
                        .build()?;
                    let response = self.provider.complete(request).await?;

                    non_empty(FirstResponse {
                        content: response.text().trim().to_string(),
                        tool_calls: response.tool_calls(),
                    })
                },
            )
            .await
        })
    }

    fn finish_turn<'a>(
        &'a self,
        conversation: &'a [Message],
        first: &'a FirstResponse,
        results: &'a [ToolExecutionResult],
        turn: &'a TurnContext,
    ) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let outcome = execute_observed(
                self.provider_id(),
                FINISH_TURN,
                turn.attempt,
                self.settings.hooks.as_ref(),
                async {
                    let request = self
                        .settings
                        .request(conversation.to_vec(), turn)
                        .tools(self.settings.tools.clone())
                        .tool_exchange(
                            first.tool_calls.clone(),
                            results
                                .iter()
                                .map(ToolExecutionResult::to_tool_result)
                                .collect(),
                        )
                        .build()?;
                    self.provider.complete(request).await
                },
            )
            .await;

            final_text(outcome.map(|response| response.text()))
        })
    }
}

impl std::fmt::Debug for NativeToolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeToolAdapter")
            .field("provider", &self.provider.id())
            .field("settings", &self.settings)
            .finish()
    }
}

pub struct PromptProtocolAdapter {
    provider: Arc<dyn mprovider::ModelProvider>,
    settings: AdapterSettings,
}

impl PromptProtocolAdapter {
    pub fn new(provider: Arc<dyn mprovider::ModelProvider>, settings: AdapterSettings) -> Self {
        Self { provider, settings }
    }

    /// Appends the search convention to the first system message.
    fn with_protocol(&self, conversation: &[Message]) -> Vec<Message> {
        let mut messages = conversation.to_vec();
        let Some(instructions) = protocol_instructions(&self.settings.tools) else {
            return messages;
        };

        match messages
            .iter_mut()
            .find(|message| message.role == Role::System)
        {
            Some(system) => {
                system.content.push_str("\n\n");
                system.content.push_str(&instructions);
            }
            None => messages.insert(0, Message::system(instructions)),
        }

        messages
    }
}

/// Renders tool results as a user message for backends without tool roles.
pub fn results_context_message(results: &[ToolExecutionResult]) -> String {
    let mut sections = Vec::with_capacity(results.len());
    for result in results {
        let status = if result.is_error() { "failed" } else { "succeeded" };
        sections.push(format!(
            "[{}] {} ({status})\n{}",
            result.tool_call_id, result.tool_name, result.payload
        ));
    }

    format!(
        "Here are the search results you asked for:\n\n{}\n\nUsing these results, answer my \
         original question. Mention where the information came from, and if a search failed, \
         say so briefly and still give your best recommendation. Do not request more searches.",
        sections.join("\n\n")
    )
}

impl TurnAdapter for PromptProtocolAdapter {
    fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    fn begin_turn<'a>(
        &'a self,
        conversation: &'a [Message],
        turn: &'a TurnContext,
    ) -> BoxFuture<'a, Result<FirstResponse, ProviderError>> {
        Box::pin(async move {
            execute_observed(
                self.provider_id(),
                BEGIN_TURN,
                turn.attempt,
                self.settings.hooks.as_ref(),
                async {
                    let request = self
                        .settings
                        .request(self.with_protocol(conversation), turn)
                        .build()?;
                    let response = self.provider.complete(request).await?;
                    let text = response.text();
                    let parsed = parse_completion(&text);

                    non_empty(FirstResponse {
                        tool_calls: parsed.tool_calls(),
                        content: parsed.preamble,
                    })
                },
            )
            .await
        })
    }

    fn finish_turn<'a>(
        &'a self,
        conversation: &'a [Message],
        first: &'a FirstResponse,
        results: &'a [ToolExecutionResult],
        turn: &'a TurnContext,
    ) -> BoxFuture<'a, String> {
        Box::pin(async move {
            let assistant_step = if first.content.is_empty() {
                "Let me look that up.".to_string()
            } else {
                first.content.clone()
            };

            let mut messages = conversation.to_vec();
            messages.push(Message::assistant(assistant_step));
            messages.push(Message::user(results_context_message(results)));

            let outcome = execute_observed(
                self.provider_id(),
                FINISH_TURN,
                turn.attempt,
                self.settings.hooks.as_ref(),
                async {
                    let request = self.settings.request(messages, turn).build()?;
                    self.provider.complete(request).await
                },
            )
            .await;

            // A second search request at this point is not honoured.
            final_text(outcome.map(|response| parse_completion(&response.text()).preamble))
        })
    }
}

impl std::fmt::Debug for PromptProtocolAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptProtocolAdapter")
            .field("provider", &self.provider.id())
            .field("settings", &self.settings)
            .finish()
    }
}
