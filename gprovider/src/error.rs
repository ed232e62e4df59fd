//! Shared provider error kinds, the failure classification table, and error helpers.
//!
//! Every provider failure carries a [`ProviderErrorKind`]. The fallback executor
//! only ever asks one question of a kind: is it worth trying the next model in
//! the chain? [`ProviderErrorKind::failure_class`] answers it.
//!
//! ```rust
//! use gprovider::{FailureClass, ProviderError, ProviderErrorKind};
//!
//! let auth = ProviderError::authentication("bad key");
//! assert!(!auth.is_transient());
//!
//! let timeout = ProviderError::timeout("temporary timeout");
//! assert!(timeout.is_transient());
//!
//! assert_eq!(ProviderErrorKind::from_status(429), ProviderErrorKind::RateLimited);
//! assert_eq!(ProviderErrorKind::Unavailable.failure_class(), FailureClass::Transient);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimited,
    InvalidRequest,
    ContentPolicy,
    Timeout,
    Transport,
    Unavailable,
    NotConfigured,
    Other,
}

/// Whether a failure should move the chain on to the next model or stop it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    Fatal,
}

impl ProviderErrorKind {
    pub const ALL: [ProviderErrorKind; 9] = [
        Self::Authentication,
        Self::RateLimited,
        Self::InvalidRequest,
        Self::ContentPolicy,
        Self::Timeout,
        Self::Transport,
        Self::Unavailable,
        Self::NotConfigured,
        Self::Other,
    ];

    pub const fn failure_class(self) -> FailureClass {
        match self {
            Self::RateLimited | Self::Unavailable | Self::Timeout => FailureClass::Transient,
            Self::Authentication
            | Self::InvalidRequest
            | Self::ContentPolicy
            | Self::Transport
            | Self::NotConfigured
            | Self::Other => FailureClass::Fatal,
        }
    }

    /// Maps an HTTP status code returned by a provider endpoint to a kind.
    ///
    /// 529 is the non-standard "overloaded" status some vendors use.
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            429 => Self::RateLimited,
            408 | 504 => Self::Timeout,
            400 | 404 | 413 | 422 => Self::InvalidRequest,
            502 | 503 | 529 => Self::Unavailable,
            _ => Self::Other,
        }
    }

    /// Maps a provider-reported status or error type string to a kind.
    ///
    /// Covers Google RPC status names (`RESOURCE_EXHAUSTED`) and the error `type`/`code`
    /// values of OpenAI-compatible APIs (`rate_limit_exceeded`). Matching ignores case.
    pub fn from_provider_status(status: &str) -> Option<Self> {
        let kind = match status.trim().to_ascii_uppercase().as_str() {
            "RESOURCE_EXHAUSTED" | "RATE_LIMIT_EXCEEDED" | "RATE_LIMIT_ERROR" => Self::RateLimited,
            "UNAVAILABLE" | "OVERLOADED" | "OVERLOADED_ERROR" | "SERVER_OVERLOADED" => {
                Self::Unavailable
            }
            "DEADLINE_EXCEEDED" => Self::Timeout,
            "INVALID_ARGUMENT" | "FAILED_PRECONDITION" | "NOT_FOUND" | "INVALID_REQUEST_ERROR" => {
                Self::InvalidRequest
            }
            "PERMISSION_DENIED" | "UNAUTHENTICATED" | "AUTHENTICATION_ERROR"
            | "INVALID_API_KEY" => Self::Authentication,
            "CONTENT_POLICY_VIOLATION" | "CONTENT_FILTER" | "SAFETY" => Self::ContentPolicy,
            _ => return None,
        };

        Some(kind)
    }

    /// Combines the HTTP status with an optional provider status; a recognized provider
    /// status wins because it is more specific (Gemini reports overload as 503 `UNAVAILABLE`
    /// but quota as 429 `RESOURCE_EXHAUSTED`).
    pub fn classify_http(status: u16, provider_status: Option<&str>) -> Self {
        provider_status
            .and_then(Self::from_provider_status)
            .unwrap_or_else(|| Self::from_status(status))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Authentication, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message)
    }

    pub fn content_policy(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::ContentPolicy, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message)
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NotConfigured, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message)
    }

    pub fn failure_class(&self) -> FailureClass {
        self.kind.failure_class()
    }

    pub fn is_transient(&self) -> bool {
        self.failure_class() == FailureClass::Transient
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ProviderError {}
