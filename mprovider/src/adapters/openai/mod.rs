//! OpenAI chat-completions adapter with native function calling.
//!
//! The HTTP transport speaks the OpenAI-compatible wire format and is shared
//! with other vendors that expose the same endpoint shape.

mod auth;
mod provider;
mod serde_api;
mod transport;
mod types;

pub(crate) use auth::resolve_api_key_auth;
pub use provider::OpenAiProvider;
pub use transport::{OPENAI_BASE_URL, OpenAiHttpTransport, OpenAiTransport};
pub use types::{
    OpenAiAssistantMessage, OpenAiAuth, OpenAiFinishReason, OpenAiMessage, OpenAiRequest,
    OpenAiResponse, OpenAiRole, OpenAiTool, OpenAiToolCall, OpenAiUsage,
};
