//! Ordered provider failover.
//!
//! Each provider gets exactly one attempt at a whole turn. The first success
//! wins; when every provider fails, the last typed error is returned.

use std::future::Future;

use mprovider::{ProviderError, ProviderId, ProviderOperationHooks, RegisteredProvider};

use crate::ChatError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailoverOutcome<T> {
    pub provider: ProviderId,
    pub value: T,
    /// Number of providers tried, including the successful one.
    pub attempts: u32,
}

pub async fn run_with_failover<T, F, Fut>(
    order: Vec<RegisteredProvider>,
    hooks: &dyn ProviderOperationHooks,
    mut turn: F,
) -> Result<FailoverOutcome<T>, ChatError>
where
    F: FnMut(RegisteredProvider, u32) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    if order.is_empty() {
        return Err(ChatError::not_configured(
            "no model provider has credentials configured",
        ));
    }

    let mut last_failure: Option<(ProviderId, ProviderError)> = None;
    let mut remaining = order.into_iter().peekable();
    let mut attempts = 0_u32;

    while let Some(entry) = remaining.next() {
        attempts += 1;
        let provider = entry.descriptor.id;

        match turn(entry, attempts).await {
            Ok(value) => {
                return Ok(FailoverOutcome {
                    provider,
                    value,
                    attempts,
                });
            }
            Err(error) => {
                if let Some(next) = remaining.peek() {
                    hooks.on_failover(provider, next.descriptor.id, &error);
                }
                last_failure = Some((provider, error));
            }
        }
    }

    match last_failure {
        Some((provider, error)) => Err(ChatError::provider(provider, error)),
        None => Err(ChatError::not_configured(
            "no model provider has credentials configured",
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use mprovider::{
        ModelProvider, ModelRequest, ModelResponse, NoopOperationHooks, ProviderDescriptor,
        ProviderErrorKind, ProviderFuture,
    };

    use super::*;
    use crate::ChatErrorKind;

    #[derive(Debug)]
    struct Unused(ProviderId);

    impl ModelProvider for Unused {
        fn id(&self) -> ProviderId {
            self.0
        }

        fn supports_native_tools(&self) -> bool {
            true
        }

        fn complete<'a>(
            &'a self,
            _request: ModelRequest,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async { Err(ProviderError::other("not used")) })
        }
    }

    fn entry(id: ProviderId, priority: u32) -> RegisteredProvider {
        RegisteredProvider {
            descriptor: ProviderDescriptor::new(id, "model", priority),
            provider: Arc::new(Unused(id)),
        }
    }

    #[derive(Default)]
    struct FailoverRecorder {
        transitions: Mutex<Vec<(ProviderId, ProviderId, ProviderErrorKind)>>,
    }

    impl ProviderOperationHooks for FailoverRecorder {
        fn on_failover(&self, from: ProviderId, to: ProviderId, error: &ProviderError) {
            self.transitions
                .lock()
                .expect("transitions lock")
                .push((from, to, error.kind));
        }
    }

    #[tokio::test]
    async fn empty_order_is_not_configured_and_runs_nothing() {
        let mut calls = 0;
        let error = run_with_failover(Vec::new(), &NoopOperationHooks, |_, _| {
            calls += 1;
            async { Ok::<_, ProviderError>(()) }
        })
        .await
        .expect_err("no providers should fail");

        assert_eq!(error.kind, ChatErrorKind::NotConfigured);
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn failure_moves_to_next_provider_once() {
        let hooks = FailoverRecorder::default();
        let mut tried = Vec::new();

        let outcome = run_with_failover(
            vec![entry(ProviderId::OpenAi, 1), entry(ProviderId::Perplexity, 2)],
            &hooks,
            |entry, attempt| {
                tried.push((entry.descriptor.id, attempt));
                async move {
                    match entry.descriptor.id {
                        ProviderId::OpenAi => Err(ProviderError::rate_limited("slow down")),
                        ProviderId::Perplexity => Ok("answer"),
                    }
                }
            },
        )
        .await
        .expect("second provider should succeed");

        assert_eq!(outcome.provider, ProviderId::Perplexity);
        assert_eq!(outcome.value, "answer");
        assert_eq!(outcome.attempts, 2);
        assert_eq!(
            tried,
            vec![(ProviderId::OpenAi, 1), (ProviderId::Perplexity, 2)]
        );
        assert_eq!(
            *hooks.transitions.lock().expect("transitions lock"),
            vec![(
                ProviderId::OpenAi,
                ProviderId::Perplexity,
                ProviderErrorKind::RateLimited
            )]
        );
    }

    #[tokio::test]
    async fn last_error_propagates_with_its_kind() {
        let error = run_with_failover(
            vec![entry(ProviderId::OpenAi, 1), entry(ProviderId::Perplexity, 2)],
            &NoopOperationHooks,
            |entry, _| async move {
                match entry.descriptor.id {
                    ProviderId::OpenAi => Err::<(), _>(ProviderError::timeout("slow")),
                    ProviderId::Perplexity => {
                        Err(ProviderError::authentication("bad key"))
                    }
                }
            },
        )
        .await
        .expect_err("both providers fail");

        assert_eq!(
            error.kind,
            ChatErrorKind::Provider(ProviderErrorKind::Authentication)
        );
        assert_eq!(error.provider, Some(ProviderId::Perplexity));
        assert_eq!(error.message, "bad key");
    }
}
