//! Provider registry with priority ordering and credential-based availability.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mprovider::{ProviderRegistry, SecureCredentialManager};
//!
//! let registry = ProviderRegistry::new(Arc::new(SecureCredentialManager::new()));
//! assert!(registry.is_empty());
//! assert!(registry.available_providers().is_empty());
//! ```

use std::sync::Arc;

use mcommon::Registry;

use crate::{ModelProvider, ProviderId, SecureCredentialManager};

/// Static configuration for one provider slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub id: ProviderId,
    pub model: String,
    pub enabled: bool,
    /// Lower values are attempted first.
    pub priority: u32,
}

impl ProviderDescriptor {
    pub fn new(id: ProviderId, model: impl Into<String>, priority: u32) -> Self {
        Self {
            id,
            model: model.into(),
            enabled: true,
            priority,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.id.as_str()
    }
}

#[derive(Clone)]
pub struct RegisteredProvider {
    pub descriptor: ProviderDescriptor,
    pub provider: Arc<dyn ModelProvider>,
}

impl std::fmt::Debug for RegisteredProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredProvider")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

pub struct ProviderRegistry {
    credentials: Arc<SecureCredentialManager>,
    providers: Registry<ProviderId, RegisteredProvider>,
    registration_order: Vec<ProviderId>,
}

impl ProviderRegistry {
    pub fn new(credentials: Arc<SecureCredentialManager>) -> Self {
        Self {
            credentials,
            providers: Registry::new(),
            registration_order: Vec::new(),
        }
    }

    pub fn credentials(&self) -> Arc<SecureCredentialManager> {
        Arc::clone(&self.credentials)
    }

    pub fn register<P>(&mut self, descriptor: ProviderDescriptor, provider: P)
    where
        P: ModelProvider + 'static,
    {
        self.register_arc(descriptor, Arc::new(provider));
    }

    pub fn register_arc(&mut self, descriptor: ProviderDescriptor, provider: Arc<dyn ModelProvider>) {
        let id = descriptor.id;
        if self
            .providers
            .insert(id, RegisteredProvider { descriptor, provider })
            .is_none()
        {
            self.registration_order.push(id);
        }
    }

    pub fn get(&self, provider_id: ProviderId) -> Option<RegisteredProvider> {
        self.providers.get(&provider_id).cloned()
    }

    pub fn contains(&self, provider_id: ProviderId) -> bool {
        self.providers.contains_key(&provider_id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Enabled providers whose credentials are present, by ascending priority.
    ///
    /// Ties keep registration order.
    pub fn available_providers(&self) -> Vec<RegisteredProvider> {
        let mut available = self
            .registration_order
            .iter()
            .filter_map(|id| self.providers.get(id))
            .filter(|entry| entry.descriptor.enabled)
            .filter(|entry| {
                self.credentials
                    .has_credentials(entry.descriptor.id)
                    .unwrap_or(false)
            })
            .cloned()
            .collect::<Vec<_>>();

        available.sort_by_key(|entry| entry.descriptor.priority);
        available
    }

    /// Attempt order for one request: `preferred` first when it is available,
    /// otherwise plain priority order.
    pub fn attempt_order(&self, preferred: Option<ProviderId>) -> Vec<RegisteredProvider> {
        let mut order = self.available_providers();
        if let Some(preferred) = preferred
            && let Some(index) = order
                .iter()
                .position(|entry| entry.descriptor.id == preferred)
        {
            let entry = order.remove(index);
            order.insert(0, entry);
        }

        order
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.registration_order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ModelRequest, ModelResponse, ProviderError, ProviderFuture};

    #[derive(Debug)]
    struct StubProvider(ProviderId);

    impl ModelProvider for StubProvider {
        fn id(&self) -> ProviderId {
            self.0
        }

        fn supports_native_tools(&self) -> bool {
            false
        }

        fn complete<'a>(
            &'a self,
            _request: ModelRequest,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async { Err(ProviderError::other("not used")) })
        }
    }

    fn registry_with_both(credentials: Arc<SecureCredentialManager>) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new(credentials);
        registry.register(
            ProviderDescriptor::new(ProviderId::Perplexity, "sonar", 2),
            StubProvider(ProviderId::Perplexity),
        );
        registry.register(
            ProviderDescriptor::new(ProviderId::OpenAi, "gpt-4o-mini", 1),
            StubProvider(ProviderId::OpenAi),
        );
        registry
    }

    fn names(entries: &[RegisteredProvider]) -> Vec<&'static str> {
        entries.iter().map(|entry| entry.descriptor.name()).collect()
    }

    #[test]
    fn availability_requires_credentials() {
        let credentials = Arc::new(SecureCredentialManager::new());
        let registry = registry_with_both(Arc::clone(&credentials));
        assert!(registry.available_providers().is_empty());

        credentials
            .set_api_key(ProviderId::Perplexity, "pplx-key")
            .expect("key should set");
        assert_eq!(names(&registry.available_providers()), vec!["perplexity"]);
    }

    #[test]
    fn availability_is_sorted_by_priority_and_skips_disabled() {
        let credentials = Arc::new(SecureCredentialManager::new());
        credentials
            .set_api_key(ProviderId::OpenAi, "sk-test")
            .expect("key should set");
        credentials
            .set_api_key(ProviderId::Perplexity, "pplx-key")
            .expect("key should set");

        let mut registry = registry_with_both(Arc::clone(&credentials));
        assert_eq!(
            names(&registry.available_providers()),
            vec!["openai", "perplexity"]
        );

        registry.register(
            ProviderDescriptor::new(ProviderId::OpenAi, "gpt-4o-mini", 1).disabled(),
            StubProvider(ProviderId::OpenAi),
        );
        assert_eq!(names(&registry.available_providers()), vec!["perplexity"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn preferred_provider_moves_to_front_only_when_available() {
        let credentials = Arc::new(SecureCredentialManager::new());
        credentials
            .set_api_key(ProviderId::OpenAi, "sk-test")
            .expect("key should set");
        credentials
            .set_api_key(ProviderId::Perplexity, "pplx-key")
            .expect("key should set");
        let mut registry = registry_with_both(Arc::clone(&credentials));

        assert_eq!(
            names(&registry.attempt_order(Some(ProviderId::Perplexity))),
            vec!["perplexity", "openai"]
        );

        registry.register(
            ProviderDescriptor::new(ProviderId::Perplexity, "sonar", 2).disabled(),
            StubProvider(ProviderId::Perplexity),
        );
        assert_eq!(
            names(&registry.attempt_order(Some(ProviderId::Perplexity))),
            vec!["openai"]
        );
        assert_eq!(names(&registry.attempt_order(None)), vec!["openai"]);
    }
}
