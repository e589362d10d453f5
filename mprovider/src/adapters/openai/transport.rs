//! OpenAI transport trait and reqwest-based HTTP implementation.

use reqwest::{Client, Response};

use crate::{ProviderError, ProviderErrorKind, ProviderFuture};

use super::serde_api::{OpenAiApiResponse, build_api_request, classify_status, extract_error_details};
use super::types::{OpenAiAuth, OpenAiRequest, OpenAiResponse};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
    vendor: &'static str,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
            vendor: "OpenAI",
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Vendor label used in error messages when the body carries none.
    pub fn with_vendor(mut self, vendor: &'static str) -> Self {
        self.vendor = vendor;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn parse_error(&self, response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let details = extract_error_details(&body);
        let kind = classify_status(status.as_u16(), &details);
        let message = details
            .message
            .clone()
            .unwrap_or_else(|| format!("{} request failed with status {status}", self.vendor));

        match kind {
            ProviderErrorKind::Authentication => ProviderError::authentication(message),
            ProviderErrorKind::QuotaExceeded => ProviderError::quota_exceeded(message),
            ProviderErrorKind::RateLimited => ProviderError::rate_limited(message),
            ProviderErrorKind::Timeout => ProviderError::timeout(message),
            ProviderErrorKind::InvalidRequest => ProviderError::invalid_request(message),
            ProviderErrorKind::Unavailable => ProviderError::unavailable(message),
            ProviderErrorKind::Transport | ProviderErrorKind::Other => {
                ProviderError::transport(message)
            }
        }
    }
}

fn map_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            let deadline = request.deadline;
            let api_request = build_api_request(request)?;
            let mut builder = self
                .client
                .post(self.endpoint("chat/completions"))
                .bearer_auth(auth.expose())
                .json(&api_request);

            if let Some(deadline) = deadline {
                if deadline.is_expired() {
                    return Err(ProviderError::timeout(format!(
                        "{} request deadline expired before dispatch",
                        self.vendor
                    )));
                }
                builder = builder.timeout(deadline.remaining());
            }

            let response = builder.send().await.map_err(map_send_error)?;
            if !response.status().is_success() {
                return Err(self.parse_error(response).await);
            }

            let parsed: OpenAiApiResponse = response.json().await.map_err(map_send_error)?;
            OpenAiResponse::try_from(parsed)
        })
    }
}
