//! Provider-agnostic request, response, and message model types.
//!
//! ```rust
//! use mprovider::{Message, ModelRequest, ProviderErrorKind, Role};
//!
//! let ok = ModelRequest::new_validated(
//!     "gpt-4o-mini",
//!     vec![Message::new(Role::User, "Best ramen in Seattle?")],
//! );
//! assert!(ok.is_ok());
//!
//! let err = ModelRequest::new_validated("", vec![Message::new(Role::User, "hi")])
//!     .err()
//!     .expect("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use mcommon::{Deadline, GenerationOptions, MetadataMap};

use crate::{ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenAi,
    Perplexity,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::OpenAi, ProviderId::Perplexity];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Perplexity => "perplexity",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "open-ai" | "gpt" => Ok(Self::OpenAi),
            "perplexity" | "pplx" | "sonar" => Ok(Self::Perplexity),
            other => Err(ProviderError::invalid_request(format!(
                "unknown provider '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputItem {
    Message(Message),
    ToolCall(ToolCall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
    Cancelled,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub provider: ProviderId,
    pub model: String,
    pub output: Vec<OutputItem>,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

impl ModelResponse {
    /// Concatenated assistant text across all message items.
    pub fn text(&self) -> String {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::Message(message) if message.role == Role::Assistant => {
                    Some(message.content.as_str())
                }
                _ => None,
            })
            .collect()
    }

    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::ToolCall(call) => Some(call.clone()),
                OutputItem::Message(_) => None,
            })
            .collect()
    }
}

/// A single generation request.
///
/// `tool_calls` holds the calls the assistant issued in the previous step and
/// `tool_results` answers them by id; adapters with native function calling
/// replay both so the backend can pair each result with its call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: GenerationOptions,
    pub tools: Vec<ToolDefinition>,
    pub tool_calls: Vec<ToolCall>,
    pub tool_results: Vec<ToolResult>,
    pub metadata: MetadataMap,
    pub deadline: Option<Deadline>,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: GenerationOptions::default(),
            tools: Vec::new(),
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            metadata: MetadataMap::new(),
            deadline: None,
        }
    }

    pub fn new_validated(
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Result<Self, ProviderError> {
        let request = Self::new(model, messages);
        request.validate()?;
        Ok(request)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_exchange(mut self, calls: Vec<ToolCall>, results: Vec<ToolResult>) -> Self {
        self.tool_calls = calls;
        self.tool_results = results;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_tokens) = self.options.max_tokens
            && max_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::new(
                ProviderErrorKind::InvalidRequest,
                "temperature must be in the inclusive range 0.0..=2.0",
                false,
            ));
        }

        for result in &self.tool_results {
            if !self
                .tool_calls
                .iter()
                .any(|call| call.id == result.tool_call_id)
            {
                return Err(ProviderError::invalid_request(format!(
                    "tool result '{}' does not answer any tool call",
                    result.tool_call_id
                )));
            }
        }

        if let Some(deadline) = self.deadline
            && deadline.is_expired()
        {
            return Err(ProviderError::timeout(
                "request deadline expired before dispatch",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestBuilder {
    request: ModelRequest,
}

impl ModelRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: ModelRequest::new(model, Vec::new()),
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.request.messages.extend(messages);
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.request.options = options;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.options.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.request.options.max_tokens = Some(max_tokens);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.request.tools = tools;
        self
    }

    pub fn tool_exchange(mut self, calls: Vec<ToolCall>, results: Vec<ToolResult>) -> Self {
        self.request.tool_calls = calls;
        self.request.tool_results = results;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.metadata.insert(key.into(), value.into());
        self
    }

    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.request.deadline = Some(deadline);
        self
    }

    pub fn build(self) -> Result<ModelRequest, ProviderError> {
        self.request.validate()?;
        Ok(self.request)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn provider_id_display_and_parse_are_stable() {
        assert_eq!(ProviderId::OpenAi.to_string(), "openai");
        assert_eq!(ProviderId::Perplexity.to_string(), "perplexity");
        assert_eq!("OpenAI".parse::<ProviderId>().ok(), Some(ProviderId::OpenAi));
        assert_eq!("pplx".parse::<ProviderId>().ok(), Some(ProviderId::Perplexity));

        let error = "gemini".parse::<ProviderId>().expect_err("unknown provider");
        assert_eq!(error.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn model_request_validate_enforces_contract() {
        let empty_model = ModelRequest::new("   ", vec![Message::user("hi")]);
        let err = empty_model.validate().expect_err("empty model must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let empty_messages = ModelRequest::new("gpt", Vec::new());
        let err = empty_messages
            .validate()
            .expect_err("empty messages must fail");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);

        let bad_temperature =
            ModelRequest::new("gpt", vec![Message::user("hi")]).with_temperature(3.5);
        let err = bad_temperature
            .validate()
            .expect_err("temperature must be range-checked");
        assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
    }

    #[test]
    fn tool_results_must_answer_a_known_call() {
        let orphan = ModelRequest::new("gpt", vec![Message::user("hi")]).with_tool_exchange(
            Vec::new(),
            vec![ToolResult {
                tool_call_id: "call_9".to_string(),
                output: "{}".to_string(),
            }],
        );
        let err = orphan.validate().expect_err("orphan result must fail");
        assert!(err.message.contains("call_9"));

        let paired = ModelRequest::new("gpt", vec![Message::user("hi")]).with_tool_exchange(
            vec![ToolCall {
                id: "call_9".to_string(),
                name: "search_web".to_string(),
                arguments: "{}".to_string(),
            }],
            vec![ToolResult {
                tool_call_id: "call_9".to_string(),
                output: "{}".to_string(),
            }],
        );
        assert!(paired.validate().is_ok());
    }

    #[test]
    fn expired_deadline_is_reported_as_timeout() {
        let request = ModelRequest::new("gpt", vec![Message::user("hi")])
            .with_deadline(Deadline::after(Duration::ZERO));

        let err = request.validate().expect_err("expired deadline must fail");
        assert_eq!(err.kind, ProviderErrorKind::Timeout);
    }

    #[test]
    fn builder_collects_messages_and_options() {
        let request = ModelRequest::builder("sonar")
            .message(Message::system("be brief"))
            .messages(vec![Message::user("tacos?")])
            .temperature(0.4)
            .max_tokens(300)
            .metadata("request_id", "req-1")
            .build()
            .expect("request should build");

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.options.temperature, Some(0.4));
        assert_eq!(request.options.max_tokens, Some(300));
        assert_eq!(request.metadata.get("request_id").map(String::as_str), Some("req-1"));
    }

    #[test]
    fn response_helpers_split_text_and_tool_calls() {
        let response = ModelResponse {
            provider: ProviderId::OpenAi,
            model: "gpt-4o-mini".to_string(),
            output: vec![
                OutputItem::Message(Message::assistant("Let me look that up.")),
                OutputItem::ToolCall(ToolCall {
                    id: "call_1".to_string(),
                    name: "search_web".to_string(),
                    arguments: "{\"query\":\"pizza\"}".to_string(),
                }),
            ],
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };

        assert_eq!(response.text(), "Let me look that up.");
        assert_eq!(response.tool_calls().len(), 1);
    }
}
