//! OpenAI transport trait and reqwest-based HTTP implementation.

use reqwest::{Client, Response};

use crate::adapters::request_error;
use crate::{ProviderError, ProviderErrorKind, ProviderFuture};

use super::serde_api::{OpenAiApiResponse, build_api_request, extract_error};
use super::types::{OpenAiAuth, OpenAiRequest, OpenAiResponse};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn apply_auth(
        &self,
        builder: reqwest::RequestBuilder,
        auth: &OpenAiAuth,
    ) -> reqwest::RequestBuilder {
        match auth {
            OpenAiAuth::ApiKey(key) => builder.bearer_auth(key.expose()),
            OpenAiAuth::Anonymous => builder,
        }
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (message, code) = extract_error(&body)
            .unwrap_or_else(|| (format!("OpenAI request failed with status {status}"), None));

        let kind = ProviderErrorKind::classify_http(status.as_u16(), code.as_deref());
        ProviderError::new(kind, message)
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            let fallback_model = request.model.clone();
            let api_request = build_api_request(request)?;
            let url = self.endpoint("chat/completions");
            let builder = self.client.post(url).json(&api_request);
            let response = self.apply_auth(builder, &auth).send().await.map_err(request_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let parsed: OpenAiApiResponse = response.json().await.map_err(request_error)?;

            let mut response = OpenAiResponse::try_from(parsed)?;
            if response.model.is_empty() {
                response.model = fallback_model;
            }
            Ok(response)
        })
    }
}
