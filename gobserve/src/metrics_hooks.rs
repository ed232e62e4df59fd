//! Metrics-based observability hooks for the fallback executor.
//!
//! ```rust
//! use gobserve::MetricsObservabilityHooks;
//! use gprovider::FallbackHooks;
//!
//! fn accepts_fallback_hooks(_hooks: &dyn FallbackHooks) {}
//!
//! let hooks = MetricsObservabilityHooks;
//! accepts_fallback_hooks(&hooks);
//! ```

use std::time::Duration;

use gprovider::{FailedAttempt, FallbackHooks, ModelChain, ModelTarget, ProviderError};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsObservabilityHooks;

impl FallbackHooks for MetricsObservabilityHooks {
    fn on_attempt_start(&self, target: &ModelTarget, _attempt: u32) {
        metrics::counter!(
            "guardian_fallback_attempt_total",
            "provider" => target.provider.to_string(),
            "model" => target.model.clone()
        )
        .increment(1);
    }

    fn on_skip(&self, target: &ModelTarget) {
        metrics::counter!(
            "guardian_fallback_skipped_total",
            "provider" => target.provider.to_string()
        )
        .increment(1);
    }

    fn on_fallback(&self, target: &ModelTarget, _attempt: u32, error: &ProviderError) {
        metrics::counter!(
            "guardian_fallback_transient_total",
            "provider" => target.provider.to_string(),
            "model" => target.model.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_success(&self, target: &ModelTarget, attempts: u32, elapsed: Duration) {
        metrics::counter!(
            "guardian_fallback_success_total",
            "provider" => target.provider.to_string(),
            "model" => target.model.clone()
        )
        .increment(1);
        metrics::histogram!("guardian_fallback_attempts_per_success").record(attempts as f64);
        metrics::histogram!(
            "guardian_fallback_success_latency_seconds",
            "provider" => target.provider.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    fn on_abort(&self, target: &ModelTarget, _attempts: u32, error: &ProviderError) {
        metrics::counter!(
            "guardian_fallback_fatal_total",
            "provider" => target.provider.to_string(),
            "model" => target.model.clone(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_exhausted(&self, _chain: &ModelChain, attempts: &[FailedAttempt]) {
        metrics::counter!("guardian_fallback_exhausted_total").increment(1);
        metrics::histogram!("guardian_fallback_attempts_per_exhaustion")
            .record(attempts.len() as f64);
    }
}
