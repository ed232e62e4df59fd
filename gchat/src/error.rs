//! Chat-layer errors and classification.
//!
//! Messages name the failing model and error kind only. They never echo user content
//! or provider error text, so they are safe to log at the request boundary.

use std::error::Error;
use std::fmt::{Display, Formatter};

use gprovider::{ChainFailure, ProviderError, ProviderErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    Validation,
    ProviderNotConfigured,
    FatalProvider,
    ChainExhausted { timed_out: bool },
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Validation, message)
    }

    pub fn provider_not_configured(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ProviderNotConfigured, message)
    }

    pub fn fatal_provider(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::FatalProvider, message)
    }

    pub fn chain_exhausted(timed_out: bool, message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ChainExhausted { timed_out }, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Internal, message)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<ProviderError> for ChatError {
    fn from(value: ProviderError) -> Self {
        match value.kind {
            ProviderErrorKind::NotConfigured => ChatError::provider_not_configured(value.message),
            kind => ChatError::fatal_provider(format!("provider failed with {kind:?}")),
        }
    }
}

impl From<ChainFailure> for ChatError {
    fn from(value: ChainFailure) -> Self {
        match value {
            ChainFailure::Fatal { target, error, .. }
                if error.kind == ProviderErrorKind::NotConfigured =>
            {
                ChatError::provider_not_configured(format!("{target} is not configured"))
            }
            ChainFailure::Fatal { target, error, .. } => {
                ChatError::fatal_provider(format!("{target} failed with {:?}", error.kind))
            }
            exhausted => ChatError::chain_exhausted(
                exhausted.all_timed_out(),
                format!(
                    "all {} models in the chain failed",
                    exhausted.failed_attempts().len()
                ),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gprovider::{FailedAttempt, ModelTarget, ProviderId};

    fn target(model: &str) -> ModelTarget {
        ModelTarget::new(ProviderId::Gemini, model)
    }

    #[test]
    fn fatal_chain_failure_omits_provider_text() {
        let error = ChatError::from(ChainFailure::Fatal {
            target: target("a"),
            error: ProviderError::authentication("key sk-secret rejected"),
            failed_attempts: Vec::new(),
        });

        assert_eq!(error.kind, ChatErrorKind::FatalProvider);
        assert_eq!(error.message, "gemini:a failed with Authentication");
    }

    #[test]
    fn unconfigured_target_maps_to_not_configured() {
        let error = ChatError::from(ChainFailure::Fatal {
            target: target("a"),
            error: ProviderError::not_configured("no key"),
            failed_attempts: Vec::new(),
        });

        assert_eq!(error.kind, ChatErrorKind::ProviderNotConfigured);
    }

    #[test]
    fn exhaustion_records_whether_every_attempt_timed_out() {
        let timeouts = ChainFailure::Exhausted {
            failed_attempts: vec![
                FailedAttempt {
                    target: target("a"),
                    error: ProviderError::timeout("slow"),
                },
                FailedAttempt {
                    target: target("b"),
                    error: ProviderError::timeout("slow"),
                },
            ],
        };
        assert_eq!(
            ChatError::from(timeouts).kind,
            ChatErrorKind::ChainExhausted { timed_out: true }
        );

        let mixed = ChainFailure::Exhausted {
            failed_attempts: vec![
                FailedAttempt {
                    target: target("a"),
                    error: ProviderError::timeout("slow"),
                },
                FailedAttempt {
                    target: target("b"),
                    error: ProviderError::rate_limited("quota"),
                },
            ],
        };
        let error = ChatError::from(mixed);
        assert_eq!(error.kind, ChatErrorKind::ChainExhausted { timed_out: false });
        assert_eq!(error.message, "all 2 models in the chain failed");
    }
}
