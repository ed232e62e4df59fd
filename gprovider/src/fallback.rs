//! Ordered multi-model fallback execution and its operational hook contract.
//!
//! The executor walks a [`ModelChain`] strictly in order, one call per model, and stops at
//! the first success or the first fatal failure. Transient failures (rate limits, overload,
//! timeouts) move on to the next model; when every model fails transiently the chain is
//! reported as exhausted. Entries whose provider is not registered are skipped without a
//! call; a chain with no registered entry fails with `NotConfigured`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcommon::GenerationOptions;

use crate::{
    FailureClass, ModelChain, ModelRequest, ModelResponse, ModelTarget, ProviderError,
    ProviderErrorKind, ProviderRegistry, Turn,
};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

pub trait FallbackHooks: Send + Sync {
    fn on_attempt_start(&self, _target: &ModelTarget, _attempt: u32) {}

    fn on_skip(&self, _target: &ModelTarget) {}

    fn on_fallback(&self, _target: &ModelTarget, _attempt: u32, _error: &ProviderError) {}

    fn on_success(&self, _target: &ModelTarget, _attempts: u32, _elapsed: Duration) {}

    fn on_abort(&self, _target: &ModelTarget, _attempts: u32, _error: &ProviderError) {}

    fn on_exhausted(&self, _chain: &ModelChain, _attempts: &[FailedAttempt]) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopFallbackHooks;

impl FallbackHooks for NoopFallbackHooks {}

/// How a per-call timeout is treated by the fallback executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    #[default]
    Transient,
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Success(ModelResponse),
    TransientFailure(ProviderError),
    FatalFailure(ProviderError),
}

impl ProviderOutcome {
    pub fn classify(result: Result<ModelResponse, ProviderError>, policy: TimeoutPolicy) -> Self {
        let error = match result {
            Ok(response) => return Self::Success(response),
            Err(error) => error,
        };

        let class = match (error.kind, policy) {
            (ProviderErrorKind::Timeout, TimeoutPolicy::Fatal) => FailureClass::Fatal,
            (kind, _) => kind.failure_class(),
        };

        match class {
            FailureClass::Transient => Self::TransientFailure(error),
            FailureClass::Fatal => Self::FatalFailure(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub target: ModelTarget,
    pub error: ProviderError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSuccess {
    pub response: ModelResponse,
    pub target: ModelTarget,
    pub failed_attempts: Vec<FailedAttempt>,
}

impl ChainSuccess {
    pub fn model_used(&self) -> &str {
        &self.target.model
    }

    pub fn attempts(&self) -> usize {
        self.failed_attempts.len() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainFailure {
    Fatal {
        target: ModelTarget,
        error: ProviderError,
        failed_attempts: Vec<FailedAttempt>,
    },
    Exhausted {
        failed_attempts: Vec<FailedAttempt>,
    },
}

impl ChainFailure {
    /// Transient failures that preceded the final outcome, in attempt order.
    pub fn failed_attempts(&self) -> &[FailedAttempt] {
        match self {
            Self::Fatal {
                failed_attempts, ..
            }
            | Self::Exhausted { failed_attempts } => failed_attempts,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// True when the chain exhausted and every attempt ended in a timeout.
    pub fn all_timed_out(&self) -> bool {
        match self {
            Self::Exhausted { failed_attempts } => {
                !failed_attempts.is_empty()
                    && failed_attempts
                        .iter()
                        .all(|attempt| attempt.error.kind == ProviderErrorKind::Timeout)
            }
            Self::Fatal { .. } => false,
        }
    }
}

impl Display for ChainFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal { target, error, .. } => write!(f, "{target} failed: {error}"),
            Self::Exhausted { failed_attempts } => {
                write!(f, "all {} model(s) failed transiently", failed_attempts.len())
            }
        }
    }
}

impl Error for ChainFailure {}

#[derive(Clone)]
pub struct FallbackExecutor {
    registry: ProviderRegistry,
    options: GenerationOptions,
    call_timeout: Duration,
    timeout_policy: TimeoutPolicy,
    hooks: Arc<dyn FallbackHooks>,
}

impl FallbackExecutor {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            options: GenerationOptions::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            timeout_policy: TimeoutPolicy::default(),
            hooks: Arc::new(NoopFallbackHooks),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_timeout_policy(mut self, timeout_policy: TimeoutPolicy) -> Self {
        self.timeout_policy = timeout_policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn FallbackHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn options(&self) -> GenerationOptions {
        self.options
    }

    pub fn ensure_configured(&self, chain: &ModelChain) -> Result<(), ProviderError> {
        self.registry.ensure_configured(chain)
    }

    pub async fn execute(
        &self,
        turns: &[Turn],
        chain: &ModelChain,
    ) -> Result<ChainSuccess, ChainFailure> {
        let mut failed_attempts = Vec::new();
        let mut attempt = 0u32;

        for target in chain.iter() {
            if !self.registry.contains(target.provider) {
                self.hooks.on_skip(target);
                continue;
            }

            attempt += 1;
            self.hooks.on_attempt_start(target, attempt);
            let started = Instant::now();

            match self.call(target, turns).await {
                ProviderOutcome::Success(response) => {
                    self.hooks.on_success(target, attempt, started.elapsed());
                    return Ok(ChainSuccess {
                        response,
                        target: target.clone(),
                        failed_attempts,
                    });
                }
                ProviderOutcome::TransientFailure(error) => {
                    self.hooks.on_fallback(target, attempt, &error);
                    failed_attempts.push(FailedAttempt {
                        target: target.clone(),
                        error,
                    });
                }
                ProviderOutcome::FatalFailure(error) => {
                    self.hooks.on_abort(target, attempt, &error);
                    return Err(ChainFailure::Fatal {
                        target: target.clone(),
                        error,
                        failed_attempts,
                    });
                }
            }
        }

        if attempt == 0
            && let Some(target) = chain.targets().first()
        {
            let error = ProviderError::not_configured(format!(
                "no provider in chain '{chain}' is configured"
            ));
            self.hooks.on_abort(target, 0, &error);
            return Err(ChainFailure::Fatal {
                target: target.clone(),
                error,
                failed_attempts,
            });
        }

        self.hooks.on_exhausted(chain, &failed_attempts);
        Err(ChainFailure::Exhausted { failed_attempts })
    }

    /// Issues exactly one provider call for `target`, bounded by the per-call timeout.
    pub async fn call(&self, target: &ModelTarget, turns: &[Turn]) -> ProviderOutcome {
        let result = self.try_call(target, turns).await;
        ProviderOutcome::classify(result, self.timeout_policy)
    }

    async fn try_call(
        &self,
        target: &ModelTarget,
        turns: &[Turn],
    ) -> Result<ModelResponse, ProviderError> {
        let provider = self.registry.get(target.provider).ok_or_else(|| {
            ProviderError::not_configured(format!("provider '{}' is not configured", target.provider))
        })?;

        let request = ModelRequest::builder(target.model.clone())
            .turns(turns.to_vec())
            .options(self.options)
            .build()?;

        match tokio::time::timeout(self.call_timeout, provider.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::timeout(format!(
                "{target} did not respond within {}ms",
                self.call_timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProviderId, StopReason, TokenUsage};

    fn response() -> ModelResponse {
        ModelResponse {
            provider: ProviderId::Gemini,
            model: "m".to_string(),
            text: "ok".to_string(),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    #[test]
    fn classify_follows_failure_table() {
        assert!(matches!(
            ProviderOutcome::classify(Ok(response()), TimeoutPolicy::Transient),
            ProviderOutcome::Success(_)
        ));
        assert!(matches!(
            ProviderOutcome::classify(
                Err(ProviderError::rate_limited("429")),
                TimeoutPolicy::Transient
            ),
            ProviderOutcome::TransientFailure(_)
        ));
        assert!(matches!(
            ProviderOutcome::classify(
                Err(ProviderError::unavailable("503")),
                TimeoutPolicy::Fatal
            ),
            ProviderOutcome::TransientFailure(_)
        ));
        assert!(matches!(
            ProviderOutcome::classify(
                Err(ProviderError::invalid_request("400")),
                TimeoutPolicy::Transient
            ),
            ProviderOutcome::FatalFailure(_)
        ));
        assert!(matches!(
            ProviderOutcome::classify(
                Err(ProviderError::transport("connection reset")),
                TimeoutPolicy::Transient
            ),
            ProviderOutcome::FatalFailure(_)
        ));
    }

    #[test]
    fn timeout_policy_controls_timeout_class() {
        assert!(matches!(
            ProviderOutcome::classify(Err(ProviderError::timeout("slow")), TimeoutPolicy::Transient),
            ProviderOutcome::TransientFailure(_)
        ));
        assert!(matches!(
            ProviderOutcome::classify(Err(ProviderError::timeout("slow")), TimeoutPolicy::Fatal),
            ProviderOutcome::FatalFailure(_)
        ));
    }

    #[test]
    fn all_timed_out_requires_exhaustion_with_only_timeouts() {
        let target = ModelTarget::new(ProviderId::Gemini, "a");
        let timed_out = ChainFailure::Exhausted {
            failed_attempts: vec![FailedAttempt {
                target: target.clone(),
                error: ProviderError::timeout("slow"),
            }],
        };
        assert!(timed_out.all_timed_out());

        let mixed = ChainFailure::Exhausted {
            failed_attempts: vec![
                FailedAttempt {
                    target: target.clone(),
                    error: ProviderError::timeout("slow"),
                },
                FailedAttempt {
                    target: target.clone(),
                    error: ProviderError::rate_limited("busy"),
                },
            ],
        };
        assert!(!mixed.all_timed_out());

        let fatal = ChainFailure::Fatal {
            target,
            error: ProviderError::timeout("slow"),
            failed_attempts: Vec::new(),
        };
        assert!(!fatal.all_timed_out());
        assert!(!fatal.is_exhausted());
    }
}
