//! Chat request and response envelope types.

use mprovider::{ProviderId, ToolCall};

/// One message exactly as the caller sent it; validation happens in the
/// service so every transport reports the same errors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncomingMessage {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl IncomingMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatRequest {
    pub messages: Vec<IncomingMessage>,
    /// Provider name to try first; unknown or unavailable names are ignored.
    pub preferred_provider: Option<String>,
}

impl ChatRequest {
    pub fn new(messages: Vec<IncomingMessage>) -> Self {
        Self {
            messages,
            preferred_provider: None,
        }
    }

    pub fn with_preferred_provider(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponseEnvelope {
    pub message: String,
    /// Deduplicated, in first-seen order.
    pub sources: Vec<String>,
    /// `None` when no provider was consulted.
    pub provider: Option<ProviderId>,
}

/// What a provider returned for the first call of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FirstResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl FirstResponse {
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.tool_calls.is_empty()
    }
}
