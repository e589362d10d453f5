//! Perplexity provider implemented over the OpenAI-compatible transport.
//!
//! Perplexity's chat endpoint accepts the chat-completions shape but has no
//! function calling, so tool definitions are never sent and callers drive
//! searches through a plain-text convention instead.

use std::sync::Arc;

use reqwest::Client;

use crate::adapters::openai::{
    OpenAiHttpTransport, OpenAiMessage, OpenAiRequest, OpenAiTransport, resolve_api_key_auth,
};
use crate::{
    ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderFuture, ProviderId,
    SecureCredentialManager,
};

pub const PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";

#[derive(Clone)]
pub struct PerplexityProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn OpenAiTransport>,
    fallback_model: String,
}

impl PerplexityProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            fallback_model: "sonar".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub fn default_http_transport(client: Client) -> OpenAiHttpTransport {
        OpenAiHttpTransport::new(client)
            .with_base_url(PERPLEXITY_BASE_URL)
            .with_vendor("Perplexity")
    }

    fn build_request(&self, request: ModelRequest) -> Result<OpenAiRequest, ProviderError> {
        if !request.tool_results.is_empty() || !request.tool_calls.is_empty() {
            return Err(ProviderError::invalid_request(
                "Perplexity does not accept structured tool exchanges",
            ));
        }

        let model = if request.model.trim().is_empty() {
            self.fallback_model.clone()
        } else {
            request.model
        };

        Ok(OpenAiRequest {
            model,
            messages: request
                .messages
                .into_iter()
                .map(OpenAiMessage::from)
                .collect(),
            tools: Vec::new(),
            temperature: request.options.temperature,
            max_tokens: request.options.max_tokens,
            deadline: request.deadline,
        })
    }
}

impl std::fmt::Debug for PerplexityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerplexityProvider")
            .field("transport", &self.transport)
            .field("fallback_model", &self.fallback_model)
            .finish_non_exhaustive()
    }
}

impl ModelProvider for PerplexityProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Perplexity
    }

    fn supports_native_tools(&self) -> bool {
        false
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let auth = resolve_api_key_auth(&self.credentials, ProviderId::Perplexity)?;
            let perplexity_request = self.build_request(request)?;
            let response = self.transport.complete(perplexity_request, auth).await?;
            Ok(response.into_model_response(ProviderId::Perplexity))
        })
    }
}

impl SecureCredentialManager {
    pub fn set_perplexity_api_key(&self, api_key: impl Into<String>) -> Result<(), ProviderError> {
        let api_key = api_key.into();
        if !api_key.trim().starts_with("pplx-") {
            return Err(ProviderError::authentication(
                "Perplexity API key must start with 'pplx-'",
            ));
        }

        self.set_api_key(ProviderId::Perplexity, api_key.trim())
    }
}
