//! Provider registry construction from service configuration.

use std::sync::Arc;

use reqwest::Client;
use tracing::warn;

use crate::config::{MorselConfig, ProviderSettings};
use crate::{
    ProviderDescriptor, ProviderError, ProviderId, ProviderRegistry, SecureCredentialManager,
};

/// Registers every provider whose API key is present. Providers switched
/// off in the configuration are registered disabled, so they stay out of the
/// failover chain.
///
/// A provider that cannot be registered, for example because its key has
/// the wrong vendor prefix, is logged and left out; the rest of the chain
/// still serves requests.
pub fn registry_from_config(config: &MorselConfig, http: &Client) -> ProviderRegistry {
    let credentials = Arc::new(SecureCredentialManager::new());
    let mut registry = ProviderRegistry::new(Arc::clone(&credentials));

    if let Some(api_key) = usable_key(&config.openai) {
        let registered =
            register_openai(&mut registry, &credentials, &config.openai, api_key, http);
        skip_on_error(ProviderId::OpenAi, registered);
    }
    if let Some(api_key) = usable_key(&config.perplexity) {
        let registered =
            register_perplexity(&mut registry, &credentials, &config.perplexity, api_key, http);
        skip_on_error(ProviderId::Perplexity, registered);
    }

    registry
}

fn skip_on_error(provider: ProviderId, result: Result<(), ProviderError>) {
    if let Err(err) = result {
        warn!(
            phase = "startup",
            event = "provider_skipped",
            provider = provider.as_str(),
            error_kind = err.kind.as_str(),
            error = %err.message,
            "provider configuration rejected; continuing without it"
        );
    }
}

fn usable_key(settings: &ProviderSettings) -> Option<&str> {
    settings.api_key.as_deref()
}

fn descriptor(id: ProviderId, settings: &ProviderSettings) -> ProviderDescriptor {
    let descriptor = ProviderDescriptor::new(id, settings.model.clone(), settings.priority);
    if settings.enabled {
        descriptor
    } else {
        descriptor.disabled()
    }
}

#[cfg(feature = "provider-openai")]
fn register_openai(
    registry: &mut ProviderRegistry,
    credentials: &Arc<SecureCredentialManager>,
    settings: &ProviderSettings,
    api_key: &str,
    http: &Client,
) -> Result<(), ProviderError> {
    use mprovider::adapters::openai::{OpenAiProvider, OpenAiTransport};

    let mut transport = OpenAiProvider::default_http_transport(http.clone());
    match settings.base_url.as_deref() {
        // Compatible gateways issue keys in their own formats.
        Some(base_url) => {
            transport = transport.with_base_url(base_url);
            credentials.set_api_key(ProviderId::OpenAi, api_key)?;
        }
        None => credentials.set_openai_api_key(api_key)?,
    }

    let transport: Arc<dyn OpenAiTransport> = Arc::new(transport);
    registry.register(
        descriptor(ProviderId::OpenAi, settings),
        OpenAiProvider::new(Arc::clone(credentials), transport)
            .with_fallback_model(settings.model.clone()),
    );
    Ok(())
}

#[cfg(not(feature = "provider-openai"))]
fn register_openai(
    _registry: &mut ProviderRegistry,
    _credentials: &Arc<SecureCredentialManager>,
    _settings: &ProviderSettings,
    _api_key: &str,
    _http: &Client,
) -> Result<(), ProviderError> {
    Err(ProviderError::invalid_request(
        "an OpenAI key is configured but the provider-openai feature is not enabled on morsel",
    ))
}

#[cfg(feature = "provider-perplexity")]
fn register_perplexity(
    registry: &mut ProviderRegistry,
    credentials: &Arc<SecureCredentialManager>,
    settings: &ProviderSettings,
    api_key: &str,
    http: &Client,
) -> Result<(), ProviderError> {
    use mprovider::adapters::openai::OpenAiTransport;
    use mprovider::adapters::perplexity::PerplexityProvider;

    credentials.set_perplexity_api_key(api_key)?;

    let mut transport = PerplexityProvider::default_http_transport(http.clone());
    if let Some(base_url) = settings.base_url.as_deref() {
        transport = transport.with_base_url(base_url);
    }

    let transport: Arc<dyn OpenAiTransport> = Arc::new(transport);
    registry.register(
        descriptor(ProviderId::Perplexity, settings),
        PerplexityProvider::new(Arc::clone(credentials), transport)
            .with_fallback_model(settings.model.clone()),
    );
    Ok(())
}

#[cfg(not(feature = "provider-perplexity"))]
fn register_perplexity(
    _registry: &mut ProviderRegistry,
    _credentials: &Arc<SecureCredentialManager>,
    _settings: &ProviderSettings,
    _api_key: &str,
    _http: &Client,
) -> Result<(), ProviderError> {
    Err(ProviderError::invalid_request(
        "a Perplexity key is configured but the provider-perplexity feature is not enabled on morsel",
    ))
}

#[cfg(all(test, feature = "provider-openai", feature = "provider-perplexity"))]
mod tests {
    use super::*;

    fn names(registry: &ProviderRegistry) -> Vec<&'static str> {
        registry
            .available_providers()
            .iter()
            .map(|entry| entry.descriptor.name())
            .collect()
    }

    #[test]
    fn only_keyed_and_enabled_providers_are_available() {
        let mut config = MorselConfig::default();
        assert!(registry_from_config(&config, &Client::new()).is_empty());

        config.openai.api_key = Some("sk-test".to_string());
        config.perplexity.api_key = Some("pplx-test".to_string());
        config.perplexity.enabled = false;

        let registry = registry_from_config(&config, &Client::new());
        assert_eq!(names(&registry), vec!["openai"]);
        assert_eq!(registry.len(), 2);
        assert!(
            !registry
                .get(ProviderId::Perplexity)
                .expect("disabled provider stays registered")
                .descriptor
                .enabled
        );
    }

    #[test]
    fn configured_priority_controls_attempt_order() {
        let mut config = MorselConfig::default();
        config.openai.api_key = Some("sk-test".to_string());
        config.perplexity.api_key = Some("pplx-test".to_string());
        config.perplexity.priority = 0;

        let registry = registry_from_config(&config, &Client::new());
        assert_eq!(names(&registry), vec!["perplexity", "openai"]);
    }

    #[test]
    fn malformed_vendor_key_skips_only_that_provider() {
        let mut config = MorselConfig::default();
        config.openai.api_key = Some("proj-abc123".to_string());
        config.perplexity.api_key = Some("pplx-valid".to_string());

        let registry = registry_from_config(&config, &Client::new());
        assert_eq!(names(&registry), vec!["perplexity"]);
        assert!(!registry.contains(ProviderId::OpenAi));
        assert!(!registry
            .credentials()
            .has_credentials(ProviderId::OpenAi)
            .expect("lock should work"));
    }

    #[test]
    fn custom_openai_base_url_accepts_gateway_keys() {
        let mut config = MorselConfig::default();
        config.openai.api_key = Some("gateway-key".to_string());
        config.openai.base_url = Some("http://127.0.0.1:9/v1".to_string());

        let registry = registry_from_config(&config, &Client::new());
        assert_eq!(names(&registry), vec!["openai"]);
    }
}
