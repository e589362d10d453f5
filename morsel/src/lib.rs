//! Restaurant recommendation assistant.
//!
//! This crate is the single dependency most applications need. It
//! re-exports the workspace crates, loads [`config::MorselConfig`], wires
//! providers and search tools into a [`ChatService`], and serves it over
//! HTTP.
//!
//! ```rust
//! use morsel::config::MorselConfig;
//! use morsel::runtime::build_runtime;
//!
//! let bundle = build_runtime(&MorselConfig::default()).expect("runtime should build");
//! assert!(bundle.chat.available_provider_names().is_empty());
//! ```

mod macros;

pub mod config;
pub mod http;
pub mod prelude;
pub mod providers;
pub mod runtime;

pub use mchat;
pub use mcommon;
pub use mobserve;
pub use mprovider;
pub use msearch;
pub use mtooling;

pub use mchat::{
    ChatError, ChatErrorKind, ChatPolicy, ChatRequest, ChatResponseEnvelope, ChatService,
    ChatServiceBuilder, FINAL_ANSWER_APOLOGY, IncomingMessage, OFF_TOPIC_REFUSAL,
};
pub use mcommon::{BoxFuture, Deadline, GenerationOptions, MetadataMap, RequestId};
pub use mobserve::{
    MetricsObservabilityHooks, ObservabilityHooks, SafeProviderHooks, SafeToolHooks,
    TracingObservabilityHooks,
};
pub use mprovider::{
    Message, ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks, ProviderDescriptor,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderId, ProviderOperationHooks,
    ProviderRegistry, RegisteredProvider, Role, SecureCredentialManager, ToolCall,
    ToolDefinition, ToolResult,
};
pub use msearch::{
    BraveSearchClient, CommunitySearch, RedditCredentials, RedditSearchClient, SearchError,
    SearchHit, SearchOutcome, WebFocus, WebSearch, register_search_tools,
};
pub use mtooling::{
    DefaultToolRuntime, Tool, ToolError, ToolErrorKind, ToolExecutionContext,
    ToolExecutionResult, ToolRegistry, ToolRuntime, ToolRuntimeHooks,
};

pub use config::{ConfigError, ConfigErrorKind, MorselConfig};
pub use http::{router, status_for};
pub use providers::registry_from_config;
pub use runtime::{RuntimeBundle, build_runtime, build_runtime_with};
