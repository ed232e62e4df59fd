//! Tracing-based observability hooks for the fallback executor.
//!
//! ```rust
//! use gobserve::TracingObservabilityHooks;
//! use gprovider::FallbackHooks;
//!
//! fn accepts_fallback_hooks(_hooks: &dyn FallbackHooks) {}
//!
//! let hooks = TracingObservabilityHooks;
//! accepts_fallback_hooks(&hooks);
//! ```

use std::time::Duration;

use gprovider::{FailedAttempt, FallbackHooks, ModelChain, ModelTarget, ProviderError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObservabilityHooks;

impl FallbackHooks for TracingObservabilityHooks {
    fn on_attempt_start(&self, target: &ModelTarget, attempt: u32) {
        tracing::debug!(
            phase = "fallback",
            event = "attempt_start",
            provider = %target.provider,
            model = %target.model,
            attempt
        );
    }

    fn on_skip(&self, target: &ModelTarget) {
        tracing::warn!(
            phase = "fallback",
            event = "skipped_unconfigured",
            provider = %target.provider,
            model = %target.model
        );
    }

    fn on_fallback(&self, target: &ModelTarget, attempt: u32, error: &ProviderError) {
        tracing::warn!(
            phase = "fallback",
            event = "transient_failure",
            provider = %target.provider,
            model = %target.model,
            attempt,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_success(&self, target: &ModelTarget, attempts: u32, elapsed: Duration) {
        tracing::info!(
            phase = "fallback",
            event = "success",
            provider = %target.provider,
            model = %target.model,
            attempts,
            elapsed_ms = elapsed.as_millis() as u64
        );
    }

    fn on_abort(&self, target: &ModelTarget, attempts: u32, error: &ProviderError) {
        tracing::error!(
            phase = "fallback",
            event = "fatal_failure",
            provider = %target.provider,
            model = %target.model,
            attempts,
            error_kind = ?error.kind,
            error = %error
        );
    }

    fn on_exhausted(&self, chain: &ModelChain, attempts: &[FailedAttempt]) {
        let kinds = attempts
            .iter()
            .map(|attempt| format!("{}={:?}", attempt.target, attempt.error.kind))
            .collect::<Vec<_>>()
            .join(",");

        tracing::error!(
            phase = "fallback",
            event = "exhausted",
            chain = %chain,
            attempts = attempts.len(),
            error_kinds = %kinds
        );
    }
}
