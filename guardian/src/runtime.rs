//! Runtime wiring: registry, fallback executor, session store and chat service.

use std::sync::Arc;

use gobserve::{
    CompositeFallbackHooks, MetricsObservabilityHooks, SafeFallbackHooks,
    TracingObservabilityHooks,
};

use crate::config::{Config, TimeoutStatus};
use crate::providers::build_registry;
use crate::{
    ChatService, FallbackExecutor, FallbackHooks, InMemoryConversationStore, ProviderError,
    ProviderRegistry,
};

#[derive(Clone)]
pub struct RuntimeBundle {
    pub store: Arc<InMemoryConversationStore>,
    pub chat: ChatService,
    pub timeout_status: TimeoutStatus,
}

/// Tracing and metrics hooks, each isolated so a panicking recorder cannot fail a turn.
pub fn default_hooks() -> Arc<dyn FallbackHooks> {
    Arc::new(
        CompositeFallbackHooks::new()
            .with(Arc::new(SafeFallbackHooks::new(TracingObservabilityHooks)))
            .with(Arc::new(SafeFallbackHooks::new(MetricsObservabilityHooks))),
    )
}

pub fn build_runtime(config: &Config) -> Result<RuntimeBundle, ProviderError> {
    build_runtime_with(build_registry(config)?, config)
}

pub fn build_runtime_with(
    registry: ProviderRegistry,
    config: &Config,
) -> Result<RuntimeBundle, ProviderError> {
    let chains = config.chain_set()?;

    let executor = FallbackExecutor::new(registry)
        .with_options(config.generation_options())
        .with_call_timeout(config.provider_timeout())
        .with_timeout_policy(config.timeout_policy())
        .with_hooks(default_hooks());

    let store = Arc::new(
        InMemoryConversationStore::new(config.preamble(), config.history_window)
            .with_max_sessions(config.max_sessions),
    );
    let chat = ChatService::new(executor, chains, store.clone());

    Ok(RuntimeBundle {
        store,
        chat,
        timeout_status: config.timeout_status,
    })
}
