//! Provider registry for runtime provider lookup.
//!
//! ```rust
//! use gprovider::ProviderRegistry;
//!
//! let registry = ProviderRegistry::new();
//! assert!(registry.is_empty());
//! assert_eq!(registry.len(), 0);
//! ```

use std::sync::Arc;

use gcommon::Registry;

use crate::{ModelChain, ModelProvider, ProviderError, ProviderId};

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Registry<ProviderId, Arc<dyn ModelProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P>(&mut self, provider: P)
    where
        P: ModelProvider + 'static,
    {
        self.providers.insert(provider.id(), Arc::new(provider));
    }

    pub fn register_shared(&mut self, provider: Arc<dyn ModelProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, provider_id: ProviderId) -> Option<Arc<dyn ModelProvider>> {
        self.providers.get(&provider_id).cloned()
    }

    pub fn remove(&mut self, provider_id: ProviderId) -> Option<Arc<dyn ModelProvider>> {
        self.providers.remove(&provider_id)
    }

    pub fn contains(&self, provider_id: ProviderId) -> bool {
        self.providers.contains_key(&provider_id)
    }

    /// Fails with `NotConfigured` when no entry of `chain` has a registered provider.
    /// Entries with a missing provider are tolerated while at least one can be called.
    pub fn ensure_configured(&self, chain: &ModelChain) -> Result<(), ProviderError> {
        if chain.iter().any(|target| self.contains(target.provider)) {
            return Ok(());
        }

        Err(ProviderError::not_configured(format!(
            "no provider required by chain '{chain}' is configured"
        )))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ModelRequest, ModelResponse, ProviderErrorKind, ProviderFuture, StopReason, TokenUsage,
    };

    struct EchoProvider(ProviderId);

    impl ModelProvider for EchoProvider {
        fn id(&self) -> ProviderId {
            self.0
        }

        fn complete<'a>(
            &'a self,
            request: ModelRequest,
        ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
            Box::pin(async move {
                Ok(ModelResponse {
                    provider: self.0,
                    model: request.model,
                    text: "echo".to_string(),
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                })
            })
        }
    }

    #[test]
    fn registry_registers_and_removes_providers() {
        let mut registry = ProviderRegistry::new();
        registry.register(EchoProvider(ProviderId::Gemini));

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(ProviderId::Gemini));
        assert!(registry.get(ProviderId::OpenAi).is_none());

        let provider = registry.get(ProviderId::Gemini).expect("provider should exist");
        assert_eq!(provider.id(), ProviderId::Gemini);

        assert!(registry.remove(ProviderId::Gemini).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn ensure_configured_needs_one_registered_entry() {
        let mut registry = ProviderRegistry::new();
        registry.register(EchoProvider(ProviderId::Gemini));

        let ok = ModelChain::parse("gemini:a,gemini:b").expect("chain should parse");
        assert!(registry.ensure_configured(&ok).is_ok());

        let partial = ModelChain::parse("gemini:a,openai:gpt-4o-mini").expect("chain should parse");
        assert!(registry.ensure_configured(&partial).is_ok());

        let missing =
            ModelChain::parse("openai:gpt-4o-mini,ollama:llama3").expect("chain should parse");
        let err = registry
            .ensure_configured(&missing)
            .expect_err("no provider in the chain is registered");
        assert_eq!(err.kind, ProviderErrorKind::NotConfigured);
        assert!(err.message.contains("openai:gpt-4o-mini"));
    }
}
