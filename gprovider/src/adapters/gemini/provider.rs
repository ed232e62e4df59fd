//! Gemini provider implementation over transport and shared models.

use std::sync::Arc;

use crate::{
    ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderFuture, ProviderId,
    SecureCredentialManager,
};

use super::transport::GeminiTransport;
use super::types::GeminiRequest;

#[derive(Clone)]
pub struct GeminiProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn GeminiTransport>,
    safety_threshold: Option<String>,
}

impl GeminiProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn GeminiTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
            safety_threshold: None,
        }
    }

    /// Threshold (for example `BLOCK_NONE`) sent for every harm category.
    pub fn with_safety_threshold(mut self, threshold: impl Into<String>) -> Self {
        self.safety_threshold = Some(threshold.into());
        self
    }

    pub(crate) fn build_gemini_request(&self, request: ModelRequest) -> GeminiRequest {
        let mut gemini_request = GeminiRequest::from(request);
        gemini_request.safety_threshold = self.safety_threshold.clone();
        gemini_request
    }
}

impl ModelProvider for GeminiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let api_key = self.credentials.require_api_key(ProviderId::Gemini)?;
            let gemini_request = self.build_gemini_request(request);
            let response = self.transport.complete(gemini_request, api_key).await?;
            Ok(response.into_model_response())
        })
    }
}
