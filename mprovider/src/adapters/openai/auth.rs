//! OpenAI-specific credential helpers and auth resolution policy.

use crate::{ProviderError, ProviderId, SecureCredentialManager};

use super::types::OpenAiAuth;

impl SecureCredentialManager {
    /// Stores an OpenAI API key after checking the `sk-` prefix.
    pub fn set_openai_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        if !api_key.trim().starts_with("sk-") {
            return Err(ProviderError::authentication(
                "OpenAI API key must start with 'sk-'",
            ));
        }

        self.set_api_key(ProviderId::OpenAi, api_key.trim())
    }
}

/// Resolves bearer auth for `provider` from the shared credential store.
pub(crate) fn resolve_api_key_auth(
    credentials: &SecureCredentialManager,
    provider: ProviderId,
) -> Result<OpenAiAuth, ProviderError> {
    credentials
        .api_key(provider)?
        .map(OpenAiAuth::ApiKey)
        .ok_or_else(|| {
            ProviderError::authentication(format!("no {provider} API key configured"))
        })
}
