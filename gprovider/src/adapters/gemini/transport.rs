//! Gemini transport trait and reqwest-based HTTP implementation.

use reqwest::{Client, Response};

use crate::adapters::request_error;
use crate::{ProviderError, ProviderErrorKind, ProviderFuture, SecretString};

use super::serde_api::{GeminiApiResponse, build_api_request, extract_error};
use super::types::{GeminiRequest, GeminiResponse};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub trait GeminiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: GeminiRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<GeminiResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct GeminiHttpTransport {
    client: Client,
    base_url: String,
}

impl GeminiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (message, rpc_status) = extract_error(&body)
            .unwrap_or_else(|| (format!("Gemini request failed with status {status}"), None));

        let kind = ProviderErrorKind::classify_http(status.as_u16(), rpc_status.as_deref());
        ProviderError::new(kind, message)
    }
}

impl GeminiTransport for GeminiHttpTransport {
    fn complete<'a>(
        &'a self,
        request: GeminiRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<GeminiResponse, ProviderError>> {
        Box::pin(async move {
            let model = request.model.clone();
            let api_request = build_api_request(request)?;
            let response = self
                .client
                .post(self.endpoint(&model))
                .header("x-goog-api-key", api_key.expose())
                .json(&api_request)
                .send()
                .await
                .map_err(request_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let parsed: GeminiApiResponse = response.json().await.map_err(request_error)?;

            parsed.into_response(model)
        })
    }
}
