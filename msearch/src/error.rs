//! Search collaborator errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

use mtooling::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchErrorKind {
    Unauthorized,
    RateLimited,
    Timeout,
    Transport,
    InvalidResponse,
}

impl SearchErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::RateLimited => "rate_limited",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::InvalidResponse => "invalid_response",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchError {
    pub kind: SearchErrorKind,
    pub message: String,
}

impl SearchError {
    pub fn new(kind: SearchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::Unauthorized, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::RateLimited, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::Transport, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::InvalidResponse, message)
    }

    /// Classifies a non-success HTTP status from a search backend.
    pub fn from_status(service: &str, status: u16) -> Self {
        let message = format!("{service} returned status {status}");
        match status {
            401 | 403 => Self::unauthorized(message),
            429 => Self::rate_limited(message),
            408 | 504 => Self::timeout(message),
            _ => Self::transport(message),
        }
    }

    pub(crate) fn from_reqwest(service: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(format!("{service} request timed out"))
        } else if err.is_decode() {
            Self::invalid_response(format!("{service} response could not be decoded: {err}"))
        } else {
            Self::transport(format!("{service} request failed: {err}"))
        }
    }
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for SearchError {}

impl From<SearchError> for ToolError {
    fn from(value: SearchError) -> Self {
        match value.kind {
            SearchErrorKind::Timeout => ToolError::timeout(value.message),
            SearchErrorKind::InvalidResponse => ToolError::execution(value.message),
            SearchErrorKind::Unauthorized
            | SearchErrorKind::RateLimited
            | SearchErrorKind::Transport => ToolError::unavailable(value.message),
        }
    }
}
