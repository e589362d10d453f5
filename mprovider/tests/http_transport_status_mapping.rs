#![cfg(feature = "provider-openai")]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use mcommon::Deadline;
use mprovider::adapters::openai::{OpenAiHttpTransport, OpenAiProvider};
use mprovider::{
    Message, ModelProvider, ModelRequest, ProviderErrorKind, SecureCredentialManager,
};

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let address = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{address}/v1")
}

fn provider_for(base_url: String) -> OpenAiProvider {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_openai_api_key("sk-local")
        .expect("key should set");
    let transport = OpenAiHttpTransport::new(reqwest::Client::new()).with_base_url(base_url);
    OpenAiProvider::new(credentials, Arc::new(transport))
}

fn request() -> ModelRequest {
    ModelRequest::new("gpt-4o-mini", vec![Message::user("ramen in seattle")])
}

#[tokio::test]
async fn insufficient_quota_on_429_maps_to_quota_exceeded() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#,
            )
                .into_response()
        }),
    );
    let provider = provider_for(serve(router).await);

    let error = provider.complete(request()).await.expect_err("quota should fail");
    assert_eq!(error.kind, ProviderErrorKind::QuotaExceeded);
    assert_eq!(error.message, "You exceeded your current quota");
}

#[tokio::test]
async fn unauthorized_maps_to_authentication() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::UNAUTHORIZED, "nope").into_response() }),
    );
    let provider = provider_for(serve(router).await);

    let error = provider.complete(request()).await.expect_err("401 should fail");
    assert_eq!(error.kind, ProviderErrorKind::Authentication);
    assert!(error.message.contains("401"));
}

#[tokio::test]
async fn successful_completion_is_parsed() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::OK,
                [("content-type", "application/json")],
                r#"{"model":"gpt-4o-mini","choices":[{"message":{"content":"Try Lucali."},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#,
            )
                .into_response()
        }),
    );
    let provider = provider_for(serve(router).await);

    let response = provider.complete(request()).await.expect("completion should work");
    assert_eq!(response.text(), "Try Lucali.");
    assert_eq!(response.usage.total_tokens, 5);
}

#[tokio::test]
async fn slow_backend_is_cut_off_by_the_request_deadline() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, "{}").into_response()
        }),
    );
    let provider = provider_for(serve(router).await);

    let error = provider
        .complete(request().with_deadline(Deadline::after(Duration::from_millis(150))))
        .await
        .expect_err("deadline should fire");
    assert_eq!(error.kind, ProviderErrorKind::Timeout);
}
