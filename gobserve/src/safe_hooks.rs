use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use gprovider::{FailedAttempt, FallbackHooks, ModelChain, ModelTarget, ProviderError};

pub struct SafeFallbackHooks<H> {
    inner: H,
}

impl<H> SafeFallbackHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

impl<H> FallbackHooks for SafeFallbackHooks<H>
where
    H: FallbackHooks,
{
    fn on_attempt_start(&self, target: &ModelTarget, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(target, attempt)
        }));
    }

    fn on_skip(&self, target: &ModelTarget) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_skip(target)));
    }

    fn on_fallback(&self, target: &ModelTarget, attempt: u32, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_fallback(target, attempt, error)
        }));
    }

    fn on_success(&self, target: &ModelTarget, attempts: u32, elapsed: Duration) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(target, attempts, elapsed)
        }));
    }

    fn on_abort(&self, target: &ModelTarget, attempts: u32, error: &ProviderError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_abort(target, attempts, error)
        }));
    }

    fn on_exhausted(&self, chain: &ModelChain, attempts: &[FailedAttempt]) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_exhausted(chain, attempts)));
    }
}

/// Fans every callback out to each inner hook set, in registration order.
#[derive(Default, Clone)]
pub struct CompositeFallbackHooks {
    hooks: Vec<Arc<dyn FallbackHooks>>,
}

impl CompositeFallbackHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: Arc<dyn FallbackHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl FallbackHooks for CompositeFallbackHooks {
    fn on_attempt_start(&self, target: &ModelTarget, attempt: u32) {
        for hooks in &self.hooks {
            hooks.on_attempt_start(target, attempt);
        }
    }

    fn on_skip(&self, target: &ModelTarget) {
        for hooks in &self.hooks {
            hooks.on_skip(target);
        }
    }

    fn on_fallback(&self, target: &ModelTarget, attempt: u32, error: &ProviderError) {
        for hooks in &self.hooks {
            hooks.on_fallback(target, attempt, error);
        }
    }

    fn on_success(&self, target: &ModelTarget, attempts: u32, elapsed: Duration) {
        for hooks in &self.hooks {
            hooks.on_success(target, attempts, elapsed);
        }
    }

    fn on_abort(&self, target: &ModelTarget, attempts: u32, error: &ProviderError) {
        for hooks in &self.hooks {
            hooks.on_abort(target, attempts, error);
        }
    }

    fn on_exhausted(&self, chain: &ModelChain, attempts: &[FailedAttempt]) {
        for hooks in &self.hooks {
            hooks.on_exhausted(chain, attempts);
        }
    }
}
