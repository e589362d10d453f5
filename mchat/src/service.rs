//! Request orchestration: validation, topic guard, provider turns, and
//! response assembly.

use std::sync::Arc;
use std::time::Duration;

use mcommon::{GenerationOptions, RequestId};
use mprovider::{
    Message, NoopOperationHooks, ProviderError, ProviderId, ProviderOperationHooks,
    ProviderRegistry, RegisteredProvider, Role, ToolDefinition,
};
use mtooling::{DefaultToolRuntime, ToolExecutionContext, ToolExecutionResult, ToolRuntime};

use crate::adapter::{AdapterSettings, TurnContext, adapter_for};
use crate::failover::run_with_failover;
use crate::prompt::{OFF_TOPIC_REFUSAL, is_on_topic, system_prompt};
use crate::{ChatError, ChatRequest, ChatResponseEnvelope, IncomingMessage};

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatPolicy {
    /// Budget for each individual provider call.
    pub provider_timeout: Duration,
    pub options: GenerationOptions,
}

impl Default for ChatPolicy {
    fn default() -> Self {
        Self {
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            options: GenerationOptions::default()
                .with_temperature(0.7)
                .with_max_tokens(1000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TurnOutput {
    message: String,
    sources: Vec<String>,
}

pub struct ChatService {
    providers: Arc<ProviderRegistry>,
    tools: Arc<dyn ToolRuntime>,
    hooks: Arc<dyn ProviderOperationHooks>,
    policy: ChatPolicy,
}

impl ChatService {
    pub fn builder(providers: Arc<ProviderRegistry>) -> ChatServiceBuilder {
        ChatServiceBuilder::new(providers)
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn policy(&self) -> ChatPolicy {
        self.policy
    }

    pub fn available_provider_names(&self) -> Vec<&'static str> {
        self.providers
            .available_providers()
            .iter()
            .map(|entry| entry.descriptor.name())
            .collect()
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponseEnvelope, ChatError> {
        let conversation = validate_messages(&request.messages)?;

        let preferred = request
            .preferred_provider
            .as_deref()
            .and_then(|name| name.parse::<ProviderId>().ok());
        let order = self.providers.attempt_order(preferred);
        if order.is_empty() {
            return Err(ChatError::not_configured(
                "no model provider has credentials configured",
            ));
        }

        if !is_on_topic(&conversation) {
            return Ok(ChatResponseEnvelope {
                message: OFF_TOPIC_REFUSAL.to_string(),
                sources: Vec::new(),
                provider: None,
            });
        }

        let tools = self.tools.definitions();
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(Message::system(system_prompt(&tools)));
        messages.extend(conversation);

        let request_id = RequestId::generate();

        let messages = messages.as_slice();
        let tools = tools.as_slice();
        let request_id = &request_id;
        let outcome = run_with_failover(
            order,
            self.hooks.as_ref(),
            move |entry, attempt| self.provider_turn(entry, attempt, messages, tools, request_id),
        )
        .await?;

        Ok(ChatResponseEnvelope {
            message: outcome.value.message,
            sources: outcome.value.sources,
            provider: Some(outcome.provider),
        })
    }

    async fn provider_turn(
        &self,
        entry: RegisteredProvider,
        attempt: u32,
        messages: &[Message],
        tools: &[ToolDefinition],
        request_id: &RequestId,
    ) -> Result<TurnOutput, ProviderError> {
        let adapter = adapter_for(
            &entry,
            AdapterSettings {
                model: entry.descriptor.model.clone(),
                options: self.policy.options,
                tools: tools.to_vec(),
                call_timeout: self.policy.provider_timeout,
                hooks: Arc::clone(&self.hooks),
            },
        );
        let turn = TurnContext {
            request_id: request_id.clone(),
            attempt,
        };

        let first = adapter.begin_turn(messages, &turn).await?;
        if first.tool_calls.is_empty() {
            return Ok(TurnOutput {
                message: first.content,
                sources: Vec::new(),
            });
        }

        let context = ToolExecutionContext::new(request_id.clone())
            .with_metadata("provider", entry.descriptor.name());
        let results = self
            .tools
            .execute_all(first.tool_calls.clone(), context)
            .await;
        let sources = collect_sources(&results);
        let message = adapter.finish_turn(messages, &first, &results, &turn).await;

        Ok(TurnOutput { message, sources })
    }
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("providers", &self.providers)
            .field("tools", &self.tools.definitions().len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

pub struct ChatServiceBuilder {
    providers: Arc<ProviderRegistry>,
    tools: Arc<dyn ToolRuntime>,
    hooks: Arc<dyn ProviderOperationHooks>,
    policy: ChatPolicy,
}

impl ChatServiceBuilder {
    pub fn new(providers: Arc<ProviderRegistry>) -> Self {
        Self {
            providers,
            tools: Arc::new(DefaultToolRuntime::default()),
            hooks: Arc::new(NoopOperationHooks),
            policy: ChatPolicy::default(),
        }
    }

    pub fn tool_runtime(mut self, tools: Arc<dyn ToolRuntime>) -> Self {
        self.tools = tools;
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn policy(mut self, policy: ChatPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn provider_timeout(mut self, timeout: Duration) -> Self {
        self.policy.provider_timeout = timeout;
        self
    }

    pub fn build(self) -> ChatService {
        ChatService {
            providers: self.providers,
            tools: self.tools,
            hooks: self.hooks,
            policy: self.policy,
        }
    }
}

/// Checks caller messages and converts them to provider messages.
pub fn validate_messages(messages: &[IncomingMessage]) -> Result<Vec<Message>, ChatError> {
    if messages.is_empty() {
        return Err(ChatError::invalid_request(
            "messages must contain at least one message",
        ));
    }

    messages
        .iter()
        .enumerate()
        .map(|(index, message)| {
            let role = message.role.as_deref().ok_or_else(|| {
                ChatError::invalid_request(format!("messages[{index}] is missing a role"))
            })?;
            let role = parse_role(role).ok_or_else(|| {
                ChatError::invalid_request(format!(
                    "messages[{index}] has invalid role '{role}'; expected user, assistant, or system"
                ))
            })?;

            let content = message.content.as_deref().ok_or_else(|| {
                ChatError::invalid_request(format!("messages[{index}] is missing content"))
            })?;
            if content.trim().is_empty() {
                return Err(ChatError::invalid_request(format!(
                    "messages[{index}] content must not be empty"
                )));
            }

            Ok(Message::new(role, content))
        })
        .collect()
}

fn parse_role(role: &str) -> Option<Role> {
    match role.trim() {
        "user" => Some(Role::User),
        "assistant" => Some(Role::Assistant),
        "system" => Some(Role::System),
        _ => None,
    }
}

/// Sources of all results, deduplicated keeping first occurrence.
pub fn collect_sources(results: &[ToolExecutionResult]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for source in results.iter().flat_map(|result| result.sources.iter()) {
        if !sources.contains(source) {
            sources.push(source.clone());
        }
    }

    sources
}
