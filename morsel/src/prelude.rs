//! Common imports for morsel applications.

pub use crate::{build_runtime, build_runtime_with, registry_from_config, router};
pub use crate::{morsel_messages, morsel_msg};
pub use crate::{
    ChatError, ChatErrorKind, ChatRequest, ChatResponseEnvelope, ChatService, IncomingMessage,
    ModelProvider, MorselConfig, ObservabilityHooks, ProviderDescriptor, ProviderError,
    ProviderId, ProviderRegistry, RuntimeBundle, SecureCredentialManager, ToolRegistry,
};
