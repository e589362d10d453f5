//! Common `mprovider` imports for downstream crates.

pub use crate::{
    Message, ModelProvider, ModelRequest, ModelRequestBuilder, ModelResponse, NoopOperationHooks,
    OutputItem, ProviderDescriptor, ProviderError, ProviderErrorKind, ProviderId,
    ProviderOperationHooks, ProviderRegistry, RegisteredProvider, Role, StopReason, TokenUsage,
    ToolCall, ToolDefinition, ToolResult, execute_observed,
};
pub use mcommon::{BoxFuture, Deadline, MetadataMap};
