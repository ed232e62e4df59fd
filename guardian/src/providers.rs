//! Provider construction from process configuration.
//!
//! A provider is registered only when its credential (or, for Ollama, its base URL)
//! is configured. Chain entries naming an unregistered provider are skipped at call
//! time; a chain with no registered entry fails per request with `ProviderNotConfigured`,
//! never at startup.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::{
    ModelProvider, ProviderError, ProviderId, ProviderRegistry, SecureCredentialManager,
};

pub fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ProviderError::transport(err.to_string()))
}

pub fn build_registry(config: &Config) -> Result<ProviderRegistry, ProviderError> {
    let credentials = Arc::new(SecureCredentialManager::new());
    let http = http_client(config.provider_timeout())?;
    let mut registry = ProviderRegistry::new();

    if let Some(api_key) = non_blank(config.gemini_api_key.as_deref()) {
        registry.register_shared(build_gemini_provider(
            Arc::clone(&credentials),
            api_key,
            config.gemini_safety_threshold.clone(),
            http.clone(),
        )?);
    }

    if let Some(api_key) = non_blank(config.openai_api_key.as_deref()) {
        registry.register_shared(build_openai_provider(
            Arc::clone(&credentials),
            api_key,
            config.openai_base_url.clone(),
            http.clone(),
        )?);
    }

    if let Some(base_url) = non_blank(config.ollama_base_url.as_deref()) {
        registry.register_shared(build_ollama_provider(base_url, http)?);
    }

    for provider in [ProviderId::Gemini, ProviderId::OpenAi, ProviderId::Ollama] {
        tracing::info!(
            phase = "startup",
            event = "provider",
            provider = %provider,
            configured = registry.contains(provider)
        );
    }

    Ok(registry)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(feature = "provider-gemini")]
fn build_gemini_provider(
    credentials: Arc<SecureCredentialManager>,
    api_key: String,
    safety_threshold: Option<String>,
    http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use gprovider::adapters::gemini::{GeminiHttpTransport, GeminiProvider};

    credentials.set_api_key(ProviderId::Gemini, api_key)?;
    let transport = Arc::new(GeminiHttpTransport::new(http));
    let mut provider = GeminiProvider::new(credentials, transport);
    if let Some(threshold) = non_blank(safety_threshold.as_deref()) {
        provider = provider.with_safety_threshold(threshold);
    }

    Ok(Arc::new(provider))
}

#[cfg(not(feature = "provider-gemini"))]
fn build_gemini_provider(
    _credentials: Arc<SecureCredentialManager>,
    _api_key: String,
    _safety_threshold: Option<String>,
    _http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-gemini feature is not enabled on guardian",
    ))
}

#[cfg(feature = "provider-openai")]
fn build_openai_provider(
    credentials: Arc<SecureCredentialManager>,
    api_key: String,
    base_url: String,
    http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use gprovider::adapters::openai::{OpenAiHttpTransport, OpenAiProvider};

    credentials.set_api_key(ProviderId::OpenAi, api_key)?;
    let transport = Arc::new(OpenAiHttpTransport::new(http).with_base_url(base_url));
    Ok(Arc::new(OpenAiProvider::new(credentials, transport)))
}

#[cfg(not(feature = "provider-openai"))]
fn build_openai_provider(
    _credentials: Arc<SecureCredentialManager>,
    _api_key: String,
    _base_url: String,
    _http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-openai feature is not enabled on guardian",
    ))
}

#[cfg(feature = "provider-ollama")]
fn build_ollama_provider(
    base_url: String,
    http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    use gprovider::adapters::ollama::OllamaProvider;

    let transport = Arc::new(OllamaProvider::http_transport(http, base_url));
    Ok(Arc::new(OllamaProvider::new(transport)))
}

#[cfg(not(feature = "provider-ollama"))]
fn build_ollama_provider(
    _base_url: String,
    _http: Client,
) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    Err(ProviderError::invalid_request(
        "provider-ollama feature is not enabled on guardian",
    ))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn config(args: &[&str]) -> Config {
        Config::try_parse_from(std::iter::once("guardian").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn only_configured_providers_are_registered() {
        let registry = build_registry(&config(&[
            "--gemini-api-key",
            "gm-test",
            "--openai-api-key",
            "  ",
            "--ollama-base-url",
            "http://127.0.0.1:11434/v1",
        ]))
        .expect("registry should build");

        assert!(registry.contains(ProviderId::Gemini));
        assert!(registry.contains(ProviderId::Ollama));
        assert!(!registry.contains(ProviderId::OpenAi));
    }

    #[test]
    fn missing_keys_leave_chains_unconfigured() {
        let config = config(&["--gemini-api-key", "", "--openai-api-key", ""]);
        let registry = build_registry(&config).expect("registry should build");
        let chains = config.chain_set().expect("default chains");

        let err = registry
            .ensure_configured(chains.text())
            .expect_err("gemini has no key");
        assert_eq!(err.kind, crate::ProviderErrorKind::NotConfigured);
    }
}
