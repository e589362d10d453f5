#![cfg(feature = "provider-openai")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mcommon::Deadline;
use mprovider::adapters::openai::{
    OpenAiAssistantMessage, OpenAiAuth, OpenAiFinishReason, OpenAiProvider, OpenAiRequest,
    OpenAiResponse, OpenAiRole, OpenAiToolCall, OpenAiTransport, OpenAiUsage,
};
use mprovider::{
    Message, ModelProvider, ModelRequest, ProviderError, ProviderErrorKind, ProviderFuture,
    ProviderId, SecureCredentialManager, StopReason, ToolCall, ToolDefinition, ToolResult,
};

#[derive(Debug, Default)]
struct FakeTransport {
    captured_auth: Mutex<Option<String>>,
    captured_request: Mutex<Option<OpenAiRequest>>,
}

impl OpenAiTransport for FakeTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            *self.captured_request.lock().expect("request lock") = Some(request);
            *self.captured_auth.lock().expect("auth lock") = Some(auth.expose().to_string());

            Ok(OpenAiResponse {
                model: "gpt-4o-mini".to_string(),
                message: OpenAiAssistantMessage {
                    content: String::new(),
                    tool_calls: vec![OpenAiToolCall {
                        id: "call_1".to_string(),
                        name: "search_web".to_string(),
                        arguments: "{\"query\":\"pizza brooklyn\",\"focus\":\"reviews\"}"
                            .to_string(),
                    }],
                },
                finish_reason: OpenAiFinishReason::ToolCalls,
                usage: OpenAiUsage {
                    prompt_tokens: 7,
                    completion_tokens: 3,
                    total_tokens: 10,
                },
            })
        })
    }
}

fn search_web_definition() -> ToolDefinition {
    ToolDefinition {
        name: "search_web".to_string(),
        description: "Search the web for restaurant information".to_string(),
        input_schema: "{\"type\":\"object\"}".to_string(),
    }
}

#[tokio::test]
async fn complete_maps_tool_calls_into_provider_response() {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_openai_api_key("sk-live-123")
        .expect("key should set");

    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(credentials, transport.clone());
    let request = ModelRequest::new("gpt-4o", vec![Message::user("Best pizza in Brooklyn")])
        .with_tools(vec![search_web_definition()])
        .with_deadline(Deadline::after(Duration::from_secs(30)));

    let response = provider
        .complete(request)
        .await
        .expect("completion should succeed");
    assert_eq!(response.provider, ProviderId::OpenAi);
    assert_eq!(response.stop_reason, StopReason::ToolUse);
    assert_eq!(response.usage.total_tokens, 10);
    assert_eq!(response.text(), "");
    assert_eq!(response.tool_calls()[0].name, "search_web");

    let auth = transport
        .captured_auth
        .lock()
        .expect("auth lock")
        .clone()
        .expect("auth should be captured");
    assert_eq!(auth, "sk-live-123");

    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    assert_eq!(captured.model, "gpt-4o");
    assert_eq!(captured.tools.len(), 1);
    assert!(captured.deadline.is_some());
}

#[tokio::test]
async fn tool_exchange_is_forwarded_in_wire_order() {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_openai_api_key("sk-live-123")
        .expect("key should set");

    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(credentials, transport.clone());
    let request = ModelRequest::new("gpt-4o", vec![Message::user("Best pizza in Brooklyn")])
        .with_tools(vec![search_web_definition()])
        .with_tool_exchange(
            vec![ToolCall {
                id: "call_0".to_string(),
                name: "search_web".to_string(),
                arguments: "{\"query\":\"pizza\"}".to_string(),
            }],
            vec![ToolResult {
                tool_call_id: "call_0".to_string(),
                output: "{\"results\":[]}".to_string(),
            }],
        );

    provider
        .complete(request)
        .await
        .expect("completion should succeed");

    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    let roles = captured
        .messages
        .iter()
        .map(|message| message.role)
        .collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![OpenAiRole::User, OpenAiRole::Assistant, OpenAiRole::Tool]
    );
}

#[tokio::test]
async fn missing_openai_credentials_returns_auth_error() {
    let credentials = Arc::new(SecureCredentialManager::new());
    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(credentials, transport.clone());
    let request = ModelRequest::new("gpt-4o-mini", vec![Message::user("hi")]);

    let error = provider
        .complete(request)
        .await
        .expect_err("missing creds should fail");
    assert_eq!(error.kind, ProviderErrorKind::Authentication);
    assert_eq!(error.message, "no openai API key configured");
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}

#[tokio::test]
async fn expired_deadline_fails_before_reaching_transport() {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_openai_api_key("sk-live-123")
        .expect("key should set");

    let transport = Arc::new(FakeTransport::default());
    let provider = OpenAiProvider::new(credentials, transport.clone());
    let request = ModelRequest::new("gpt-4o-mini", vec![Message::user("hi")])
        .with_deadline(Deadline::after(Duration::ZERO));

    let error = provider
        .complete(request)
        .await
        .expect_err("expired deadline should fail");
    assert_eq!(error.kind, ProviderErrorKind::Timeout);
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}
