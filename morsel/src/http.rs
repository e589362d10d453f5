//! HTTP surface: `POST <chat_path>` and `GET /health`.
//!
//! The request body is decoded here, but every semantic check happens in
//! [`ChatService`], so malformed conversations produce the same error no
//! matter how they arrive. Error kinds become status codes in exactly one
//! place, [`status_for`].

use std::sync::Arc;

use axum::{Json, Router};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{ChatError, ChatErrorKind, ChatRequest, ChatService, IncomingMessage, ProviderErrorKind};

pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequestBody {
    #[serde(default)]
    messages: Vec<MessageBody>,
    #[serde(default)]
    preferred_provider: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MessageBody {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl From<ChatRequestBody> for ChatRequest {
    fn from(value: ChatRequestBody) -> Self {
        Self {
            messages: value
                .messages
                .into_iter()
                .map(|message| IncomingMessage {
                    role: message.role,
                    content: message.content,
                })
                .collect(),
            preferred_provider: value.preferred_provider,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatResponseBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
    providers: Vec<&'static str>,
}

pub fn router(service: Arc<ChatService>, chat_path: &str) -> Router {
    Router::new()
        .route(chat_path, post(chat).fallback(method_not_allowed))
        .route(HEALTH_PATH, get(health))
        .with_state(service)
}

/// The single mapping from error kinds to HTTP statuses.
pub fn status_for(kind: ChatErrorKind) -> StatusCode {
    match kind {
        ChatErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
        ChatErrorKind::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
        ChatErrorKind::Provider(kind) => match kind {
            ProviderErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ProviderErrorKind::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            ProviderErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ProviderErrorKind::Timeout => StatusCode::REQUEST_TIMEOUT,
            ProviderErrorKind::InvalidRequest
            | ProviderErrorKind::Transport
            | ProviderErrorKind::Unavailable
            | ProviderErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

fn summary_for(kind: ChatErrorKind) -> &'static str {
    match kind {
        ChatErrorKind::InvalidRequest => "Invalid request",
        ChatErrorKind::NotConfigured => "No AI providers are configured",
        ChatErrorKind::Provider(ProviderErrorKind::Authentication) => {
            "AI provider authentication failed"
        }
        ChatErrorKind::Provider(ProviderErrorKind::QuotaExceeded) => "AI provider quota exceeded",
        ChatErrorKind::Provider(ProviderErrorKind::RateLimited) => {
            "AI provider rate limit reached, please retry shortly"
        }
        ChatErrorKind::Provider(ProviderErrorKind::Timeout) => "AI provider timed out",
        ChatErrorKind::Provider(_) => "Failed to generate a response",
    }
}

async fn chat(State(service): State<Arc<ChatService>>, body: Bytes) -> Response {
    let body = match serde_json::from_slice::<ChatRequestBody>(&body) {
        Ok(body) => body,
        Err(err) => {
            warn!(phase = "http", event = "malformed_body", error = %err, "rejecting chat request");
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON body", Some(err.to_string()));
        }
    };

    match service.chat(body.into()).await {
        Ok(envelope) => {
            info!(
                phase = "http",
                event = "chat_completed",
                provider = envelope.provider.map(|id| id.as_str()).unwrap_or("none"),
                sources = envelope.sources.len(),
                "chat request completed"
            );
            let body = ChatResponseBody {
                message: envelope.message,
                sources: envelope.sources,
                provider: envelope.provider.map(|id| id.as_str()),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => chat_error_response(&err),
    }
}

async fn health(State(service): State<Arc<ChatService>>) -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        providers: service.available_provider_names(),
    })
}

async fn method_not_allowed() -> Response {
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method not allowed",
        Some("use POST".to_string()),
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static("POST"));
    response
}

fn chat_error_response(err: &ChatError) -> Response {
    let status = status_for(err.kind);
    let provider = err.provider.map(|id| id.as_str()).unwrap_or("none");
    if status.is_server_error() {
        warn!(
            phase = "http",
            event = "chat_failed",
            error_kind = err.kind.as_str(),
            provider,
            status = status.as_u16(),
            error = %err,
            "chat request failed"
        );
    } else {
        info!(
            phase = "http",
            event = "chat_rejected",
            error_kind = err.kind.as_str(),
            provider,
            status = status.as_u16(),
            "chat request rejected"
        );
    }

    error_response(status, summary_for(err.kind), Some(err.message.clone()))
}

fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let body = ErrorBody {
        error: error.to_string(),
        details,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table_covers_every_documented_code() {
        let cases = [
            (ChatErrorKind::InvalidRequest, 400),
            (ChatErrorKind::NotConfigured, 500),
            (ChatErrorKind::Provider(ProviderErrorKind::Authentication), 401),
            (ChatErrorKind::Provider(ProviderErrorKind::QuotaExceeded), 402),
            (ChatErrorKind::Provider(ProviderErrorKind::RateLimited), 429),
            (ChatErrorKind::Provider(ProviderErrorKind::Timeout), 408),
            (ChatErrorKind::Provider(ProviderErrorKind::Transport), 500),
            (ChatErrorKind::Provider(ProviderErrorKind::Unavailable), 500),
            (ChatErrorKind::Provider(ProviderErrorKind::Other), 500),
        ];

        for (kind, expected) in cases {
            assert_eq!(status_for(kind).as_u16(), expected, "{kind:?}");
        }
    }

    #[test]
    fn request_body_uses_camel_case_and_tolerates_missing_fields() {
        let body: ChatRequestBody = serde_json::from_str(
            r#"{"messages":[{"role":"user"},{"content":"hi"}],"preferredProvider":"perplexity"}"#,
        )
        .expect("body should parse");
        let request = ChatRequest::from(body);

        assert_eq!(request.preferred_provider.as_deref(), Some("perplexity"));
        assert_eq!(request.messages[0].content, None);
        assert_eq!(request.messages[1].role, None);
    }

    #[test]
    fn response_body_omits_empty_sources_and_missing_provider() {
        let body = ChatResponseBody {
            message: "hello".to_string(),
            sources: Vec::new(),
            provider: None,
        };
        let json = serde_json::to_value(&body).expect("body should serialize");
        assert_eq!(json, serde_json::json!({ "message": "hello" }));
    }
}
