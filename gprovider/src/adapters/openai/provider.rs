//! OpenAI provider implementation over transport and shared models.

use std::sync::Arc;

use crate::{
    ModelProvider, ModelRequest, ModelResponse, ProviderError, ProviderFuture, ProviderId,
    SecureCredentialManager,
};

use super::auth::resolve_openai_auth;
use super::transport::OpenAiTransport;
use super::types::OpenAiRequest;

#[derive(Clone)]
pub struct OpenAiProvider {
    credentials: Arc<SecureCredentialManager>,
    transport: Arc<dyn OpenAiTransport>,
}

impl OpenAiProvider {
    pub fn new(
        credentials: Arc<SecureCredentialManager>,
        transport: Arc<dyn OpenAiTransport>,
    ) -> Self {
        Self {
            credentials,
            transport,
        }
    }
}

impl ModelProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let auth = resolve_openai_auth(&self.credentials)?;
            let response = self
                .transport
                .complete(OpenAiRequest::from(request), auth)
                .await?;
            response.into_model_response(ProviderId::OpenAi)
        })
    }
}
