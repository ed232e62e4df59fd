//! Secure in-memory API key storage.
//!
//! Keys are never printed by `Debug` and are zeroed when dropped.
//!
//! ```rust
//! use gprovider::{ProviderId, SecureCredentialManager};
//!
//! let credentials = SecureCredentialManager::new();
//! credentials.set_api_key(ProviderId::Gemini, "AIza-test").expect("key should set");
//! assert!(credentials.has_api_key(ProviderId::Gemini).expect("lock"));
//! assert!(format!("{credentials:?}").contains("REDACTED"));
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{ProviderError, ProviderId};

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // SAFETY: zero bytes are valid UTF-8, so the string stays well-formed.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

#[derive(Default)]
pub struct SecureCredentialManager {
    api_keys: Mutex<HashMap<ProviderId, SecretString>>,
}

impl SecureCredentialManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_api_key(
        &self,
        provider: ProviderId,
        api_key: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let api_key = SecretString::new(api_key);
        if api_key.is_empty() {
            return Err(ProviderError::not_configured("api key must not be empty"));
        }

        self.api_keys_mut()?.insert(provider, api_key);
        Ok(())
    }

    pub fn has_api_key(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.api_keys_ref()?.contains_key(&provider))
    }

    pub fn api_key(&self, provider: ProviderId) -> Result<Option<SecretString>, ProviderError> {
        Ok(self.api_keys_ref()?.get(&provider).cloned())
    }

    /// Resolves a key or reports the provider as not configured.
    pub fn require_api_key(&self, provider: ProviderId) -> Result<SecretString, ProviderError> {
        self.api_key(provider)?.ok_or_else(|| {
            ProviderError::not_configured(format!("no {provider} API key configured"))
        })
    }

    pub fn clear(&self, provider: ProviderId) -> Result<bool, ProviderError> {
        Ok(self.api_keys_mut()?.remove(&provider).is_some())
    }

    fn api_keys_ref(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<ProviderId, SecretString>>, ProviderError> {
        self.api_keys
            .lock()
            .map_err(|_| ProviderError::other("credential manager lock poisoned"))
    }

    fn api_keys_mut(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<ProviderId, SecretString>>, ProviderError> {
        self.api_keys
            .lock()
            .map_err(|_| ProviderError::other("credential manager lock poisoned"))
    }
}

impl std::fmt::Debug for SecureCredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers = self
            .api_keys
            .lock()
            .map(|keys| keys.keys().map(ToString::to_string).collect::<Vec<_>>())
            .unwrap_or_default();

        f.debug_struct("SecureCredentialManager")
            .field("providers", &providers)
            .field("api_keys", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderErrorKind;

    #[test]
    fn empty_keys_are_rejected_as_not_configured() {
        let credentials = SecureCredentialManager::new();
        let err = credentials
            .set_api_key(ProviderId::Gemini, "  ")
            .expect_err("blank key should fail");
        assert_eq!(err.kind, ProviderErrorKind::NotConfigured);
    }

    #[test]
    fn require_api_key_reports_missing_provider() {
        let credentials = SecureCredentialManager::new();
        credentials
            .set_api_key(ProviderId::OpenAi, "sk-test")
            .expect("key should set");

        assert_eq!(
            credentials
                .require_api_key(ProviderId::OpenAi)
                .expect("key present")
                .expose(),
            "sk-test"
        );

        let err = credentials
            .require_api_key(ProviderId::Gemini)
            .expect_err("gemini key missing");
        assert_eq!(err.kind, ProviderErrorKind::NotConfigured);
        assert!(err.message.contains("gemini"));

        assert!(credentials.clear(ProviderId::OpenAi).expect("lock"));
        assert!(!credentials.has_api_key(ProviderId::OpenAi).expect("lock"));
    }

    #[test]
    fn secret_debug_output_is_redacted() {
        let secret = SecretString::new("sk-very-secret");
        assert_eq!(format!("{secret:?}"), "[REDACTED]");
    }
}
