//! Orchestration core for the morsel assistant.
//!
//! [`ChatService`] validates a conversation, refuses off-topic requests, and
//! runs one provider turn through the failover chain: the model either
//! answers directly or asks for searches, the searches run concurrently
//! under their own time budgets, and the results are fed back for a final
//! answer.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mchat::{ChatErrorKind, ChatRequest, ChatService, IncomingMessage};
//! use mprovider::{ProviderRegistry, SecureCredentialManager};
//!
//! let registry = ProviderRegistry::new(Arc::new(SecureCredentialManager::new()));
//! let service = ChatService::builder(Arc::new(registry)).build();
//! let request = ChatRequest::new(vec![IncomingMessage::user("Best tacos in Austin?")]);
//!
//! let runtime = tokio::runtime::Builder::new_current_thread()
//!     .build()
//!     .expect("runtime should build");
//! let error = runtime
//!     .block_on(service.chat(request))
//!     .expect_err("no providers are configured");
//! assert_eq!(error.kind, ChatErrorKind::NotConfigured);
//! ```

pub mod adapter;
mod error;
pub mod failover;
pub mod prompt;
pub mod protocol;
mod service;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatPolicy, ChatRequest, ChatResponseEnvelope, ChatService,
        ChatServiceBuilder, IncomingMessage,
    };
    pub use mtooling::{
        DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
        ToolExecutionResult, ToolRegistry, ToolRuntime,
    };
}

pub use adapter::{
    AdapterSettings, NativeToolAdapter, PromptProtocolAdapter, TurnAdapter, TurnContext,
    adapter_for,
};
pub use error::{ChatError, ChatErrorKind};
pub use failover::{FailoverOutcome, run_with_failover};
pub use prompt::{FINAL_ANSWER_APOLOGY, OFF_TOPIC_REFUSAL};
pub use protocol::{ParsedCompletion, SearchIntent, SearchKind, parse_completion};
pub use service::{
    ChatPolicy, ChatService, ChatServiceBuilder, DEFAULT_PROVIDER_TIMEOUT, collect_sources,
    validate_messages,
};
pub use types::{ChatRequest, ChatResponseEnvelope, FirstResponse, IncomingMessage};
