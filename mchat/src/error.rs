//! Chat-layer errors and classification.
//!
//! Provider failures keep their typed kind so the HTTP boundary can map them
//! to a status without re-parsing messages.

use std::error::Error;
use std::fmt::{Display, Formatter};

use mprovider::{ProviderError, ProviderErrorKind, ProviderId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    InvalidRequest,
    /// No provider has credentials configured.
    NotConfigured,
    Provider(ProviderErrorKind),
}

impl ChatErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::NotConfigured => "not_configured",
            Self::Provider(kind) => kind.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
    /// The provider whose failure ended the chain, if any.
    pub provider: Option<ProviderId>,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: None,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::InvalidRequest, message)
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::NotConfigured, message)
    }

    pub fn provider(provider: ProviderId, error: ProviderError) -> Self {
        Self {
            kind: ChatErrorKind::Provider(error.kind),
            message: error.message,
            provider: Some(provider),
        }
    }

    pub fn provider_kind(&self) -> Option<ProviderErrorKind> {
        match self.kind {
            ChatErrorKind::Provider(kind) => Some(kind),
            _ => None,
        }
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.provider {
            Some(provider) => write!(f, "{:?} [provider={provider}]: {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ChatError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_keep_their_kind() {
        let error = ChatError::provider(
            ProviderId::Perplexity,
            ProviderError::quota_exceeded("insufficient_quota"),
        );

        assert_eq!(
            error.kind,
            ChatErrorKind::Provider(ProviderErrorKind::QuotaExceeded)
        );
        assert_eq!(error.provider_kind(), Some(ProviderErrorKind::QuotaExceeded));
        assert_eq!(error.kind.as_str(), "quota_exceeded");
        assert_eq!(
            error.to_string(),
            "Provider(QuotaExceeded) [provider=perplexity]: insufficient_quota"
        );
    }

    #[test]
    fn non_provider_errors_have_no_provider_kind() {
        let error = ChatError::not_configured("no providers");
        assert_eq!(error.provider_kind(), None);
        assert_eq!(error.to_string(), "NotConfigured: no providers");
    }
}
