use std::future::Future;
use std::pin::Pin;

use crate::{ModelRequest, ModelResponse, ProviderError, ProviderId};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A single LLM backend.
///
/// Implementations map transport failures onto [`ProviderError`] kinds at the
/// point of failure and honour `request.deadline` for every network call.
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Whether the backend accepts structured tool definitions.
    fn supports_native_tools(&self) -> bool;

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>>;
}
