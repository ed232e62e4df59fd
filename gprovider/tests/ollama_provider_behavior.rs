#![cfg(feature = "provider-ollama")]

use std::sync::{Arc, Mutex};

use gprovider::adapters::ollama::{OLLAMA_BASE_URL, OllamaProvider};
use gprovider::adapters::openai::{
    OpenAiAuth, OpenAiFinishReason, OpenAiRequest, OpenAiResponse, OpenAiTransport, OpenAiUsage,
};
use gprovider::{
    ModelProvider, ModelRequest, ProviderError, ProviderFuture, ProviderId, StopReason, Turn,
};

#[derive(Debug, Default)]
struct FakeTransport {
    captured_auth: Mutex<Option<OpenAiAuth>>,
    captured_request: Mutex<Option<OpenAiRequest>>,
}

impl OpenAiTransport for FakeTransport {
    fn complete<'a>(
        &'a self,
        request: OpenAiRequest,
        auth: OpenAiAuth,
    ) -> ProviderFuture<'a, Result<OpenAiResponse, ProviderError>> {
        Box::pin(async move {
            *self.captured_request.lock().expect("request lock") = Some(request);
            *self.captured_auth.lock().expect("auth lock") = Some(auth);

            Ok(OpenAiResponse {
                model: "llama3.2".to_string(),
                content: "ollama-ok".to_string(),
                finish_reason: OpenAiFinishReason::Length,
                usage: OpenAiUsage {
                    prompt_tokens: 2,
                    completion_tokens: 3,
                    total_tokens: 5,
                },
            })
        })
    }
}

#[tokio::test]
async fn complete_maps_to_ollama_provider_id_without_credentials() {
    let transport = Arc::new(FakeTransport::default());
    let provider = OllamaProvider::new(transport.clone());
    let request = ModelRequest::new("llama3.2:3b", vec![Turn::user_text("hi")]);

    let response = provider
        .complete(request)
        .await
        .expect("complete should succeed");
    assert_eq!(response.provider, ProviderId::Ollama);
    assert_eq!(response.model, "llama3.2");
    assert_eq!(response.text, "ollama-ok");
    assert_eq!(response.stop_reason, StopReason::MaxTokens);

    let auth = transport
        .captured_auth
        .lock()
        .expect("auth lock")
        .clone()
        .expect("auth should be captured");
    assert_eq!(auth, OpenAiAuth::Anonymous);

    let captured = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request should be captured");
    assert_eq!(captured.model, "llama3.2:3b");
}

#[test]
fn http_transport_uses_given_base_url() {
    let transport = OllamaProvider::http_transport(reqwest::Client::new(), OLLAMA_BASE_URL);
    assert_eq!(transport.base_url(), "http://localhost:11434/v1");
}
