//! Operational hook contracts for provider attempts and failover.

use std::future::Future;

use crate::{ProviderError, ProviderId};

pub trait ProviderOperationHooks: Send + Sync {
    fn on_attempt_start(&self, _provider: ProviderId, _operation: &str, _attempt: u32) {}

    fn on_success(&self, _provider: ProviderId, _operation: &str, _attempt: u32) {}

    fn on_failure(
        &self,
        _provider: ProviderId,
        _operation: &str,
        _attempt: u32,
        _error: &ProviderError,
    ) {
    }

    /// Called when the chain abandons `from` and moves on to `to`.
    fn on_failover(&self, _from: ProviderId, _to: ProviderId, _error: &ProviderError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOperationHooks;

impl ProviderOperationHooks for NoopOperationHooks {}

/// Runs one provider operation exactly once, reporting its outcome to `hooks`.
pub async fn execute_observed<T, OpFuture>(
    provider: ProviderId,
    operation: &str,
    attempt: u32,
    hooks: &dyn ProviderOperationHooks,
    execute: OpFuture,
) -> Result<T, ProviderError>
where
    OpFuture: Future<Output = Result<T, ProviderError>>,
{
    hooks.on_attempt_start(provider, operation, attempt);

    match execute.await {
        Ok(value) => {
            hooks.on_success(provider, operation, attempt);
            Ok(value)
        }
        Err(error) => {
            hooks.on_failure(provider, operation, attempt, &error);
            Err(error)
        }
    }
}
