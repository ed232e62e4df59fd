//! OpenAI credential resolution.

use crate::{ProviderError, ProviderId, SecureCredentialManager};

use super::types::OpenAiAuth;

/// Resolves the bearer key; a missing key means the provider is not configured.
pub(crate) fn resolve_openai_auth(
    credentials: &SecureCredentialManager,
) -> Result<OpenAiAuth, ProviderError> {
    if let Some(api_key) = credentials.api_key(ProviderId::OpenAi)? {
        return Ok(OpenAiAuth::ApiKey(api_key));
    }

    Err(ProviderError::not_configured("no OpenAI API key configured"))
}
