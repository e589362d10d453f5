#![cfg(feature = "provider-perplexity")]

use std::sync::{Arc, Mutex};

use mprovider::adapters::openai::{
    OpenAiAssistantMessage, OpenAiAuth, OpenAiFinishReason, OpenAiRequest, OpenAiResponse,
    OpenAiTransport, OpenAiUsage,
};
use mprovider::adapters::perplexity::PerplexityProvider;
use mprovider::{
    Message, ModelProvider, ModelRequest, ProviderError, ProviderFuture, ProviderId,
    SecureCredentialManager, ToolDefinition,
};

#[derive(Debug, Default)]
struct RecordingTransport {
    requests: Mutex<Vec<OpenAiRequest>>,
}

impl OpenAiTransport for RecordingTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        _auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            self.requests.lock().expect("requests lock").push(request);
            Ok(OpenAiResponse {
                model: "sonar".to_string(),
                message: OpenAiAssistantMessage {
                    content: "SEARCH_NEEDED\nWEB: pizza brooklyn | reviews".to_string(),
                    tool_calls: Vec::new(),
                },
                finish_reason: OpenAiFinishReason::Stop,
                usage: OpenAiUsage::default(),
            })
        })
    }
}

#[tokio::test]
async fn perplexity_is_text_only_and_labels_its_responses() {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_perplexity_api_key("pplx-live")
        .expect("key should set");

    let transport = Arc::new(RecordingTransport::default());
    let provider = PerplexityProvider::new(credentials, transport.clone());
    assert!(!provider.supports_native_tools());

    let request = ModelRequest::new("sonar", vec![Message::user("Best pizza in Brooklyn")])
        .with_tools(vec![ToolDefinition {
            name: "search_web".to_string(),
            description: "web".to_string(),
            input_schema: "{}".to_string(),
        }]);
    let response = provider
        .complete(request)
        .await
        .expect("completion should succeed");

    assert_eq!(response.provider, ProviderId::Perplexity);
    assert!(response.text().starts_with("SEARCH_NEEDED"));
    assert!(response.tool_calls().is_empty());

    let requests = transport.requests.lock().expect("requests lock");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].tools.is_empty());
}
