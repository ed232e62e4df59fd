//! Focused unit tests for Gemini adapter internals.

#![cfg(test)]

use std::sync::Arc;

use serde_json::json;

use crate::{
    ContentPart, GenerationOptions, ModelRequest, ProviderError, ProviderErrorKind,
    ProviderFuture, SecretString, SecureCredentialManager, Turn,
};

use super::provider::GeminiProvider;
use super::serde_api::{GeminiApiResponse, build_api_request, extract_error, parse_finish_reason};
use super::transport::GeminiTransport;
use super::types::{GeminiFinishReason, GeminiRequest, GeminiResponse, GeminiRole};

#[derive(Debug)]
struct NoopTransport;

impl GeminiTransport for NoopTransport {
    fn complete<'a>(
        &'a self,
        _request: GeminiRequest,
        _api_key: SecretString,
    ) -> ProviderFuture<'a, Result<GeminiResponse, ProviderError>> {
        Box::pin(async { Err(ProviderError::other("not used")) })
    }
}

fn conversation() -> ModelRequest {
    ModelRequest::new(
        "gemini-1.5-flash",
        vec![
            Turn::system("You are a calm guardian."),
            Turn::assistant("Understood."),
            Turn::user(vec![
                ContentPart::text("what is in this photo?"),
                ContentPart::image("image/jpeg", vec![0xff, 0xd8, 0xff]),
            ]),
        ],
    )
    .with_options(
        GenerationOptions::default()
            .with_temperature(0.5)
            .with_top_p(0.5)
            .with_max_output_tokens(1024),
    )
}

#[test]
fn system_turns_become_system_instruction() {
    let provider = GeminiProvider::new(
        Arc::new(SecureCredentialManager::new()),
        Arc::new(NoopTransport),
    );
    let request = provider.build_gemini_request(conversation());

    assert_eq!(
        request.system_instruction.as_deref(),
        Some("You are a calm guardian.")
    );
    assert_eq!(request.contents.len(), 2);
    assert_eq!(request.contents[0].role, GeminiRole::Model);
    assert_eq!(request.contents[1].role, GeminiRole::User);
    assert_eq!(request.safety_threshold, None);
}

#[test]
fn api_request_serializes_inline_data_and_safety_settings() {
    let provider = GeminiProvider::new(
        Arc::new(SecureCredentialManager::new()),
        Arc::new(NoopTransport),
    )
    .with_safety_threshold("BLOCK_NONE");

    let api_request =
        build_api_request(provider.build_gemini_request(conversation())).expect("should build");
    let value = serde_json::to_value(&api_request).expect("should serialize");

    assert_eq!(
        value["systemInstruction"],
        json!({"parts": [{"text": "You are a calm guardian."}]})
    );
    assert_eq!(value["contents"][0]["role"], "model");
    assert_eq!(
        value["contents"][1]["parts"][1],
        json!({"inlineData": {"mimeType": "image/jpeg", "data": "/9j/"}})
    );
    assert_eq!(value["generationConfig"]["temperature"], 0.5);
    assert_eq!(value["generationConfig"]["topP"], 0.5);
    assert_eq!(value["generationConfig"]["maxOutputTokens"], 1024);

    let settings = value["safetySettings"].as_array().expect("safety settings");
    assert_eq!(settings.len(), 4);
    assert!(settings.iter().all(|setting| setting["threshold"] == "BLOCK_NONE"));
}

#[test]
fn safety_settings_are_omitted_without_threshold() {
    let api_request = build_api_request(GeminiRequest::from(conversation())).expect("should build");
    let value = serde_json::to_value(&api_request).expect("should serialize");
    assert!(value.get("safetySettings").is_none());
}

#[test]
fn candidate_text_and_usage_are_parsed() {
    let parsed: GeminiApiResponse = serde_json::from_value(json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "friend."}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
    }))
    .expect("response should parse");

    let response = parsed
        .into_response("gemini-1.5-flash".to_string())
        .expect("response should convert");
    assert_eq!(response.text, "Hello, friend.");
    assert_eq!(response.finish_reason, GeminiFinishReason::Stop);
    assert_eq!(response.usage.total_token_count, 16);
    assert_eq!(response.model, "gemini-1.5-flash");
}

#[test]
fn blocked_or_empty_candidates_are_content_policy_failures() {
    let blocked: GeminiApiResponse = serde_json::from_value(json!({
        "promptFeedback": {"blockReason": "SAFETY"}
    }))
    .expect("response should parse");
    let err = blocked
        .into_response("m".to_string())
        .expect_err("blocked prompt should fail");
    assert_eq!(err.kind, ProviderErrorKind::ContentPolicy);

    let empty: GeminiApiResponse =
        serde_json::from_value(json!({"candidates": []})).expect("response should parse");
    let err = empty
        .into_response("m".to_string())
        .expect_err("empty candidates should fail");
    assert_eq!(err.kind, ProviderErrorKind::ContentPolicy);

    let withheld: GeminiApiResponse = serde_json::from_value(json!({
        "candidates": [{"finishReason": "SAFETY"}]
    }))
    .expect("response should parse");
    let err = withheld
        .into_response("m".to_string())
        .expect_err("withheld reply should fail");
    assert_eq!(err.kind, ProviderErrorKind::ContentPolicy);
}

#[test]
fn error_envelope_exposes_rpc_status() {
    let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
    let (message, status) = extract_error(body).expect("error should parse");
    assert_eq!(message, "Quota exceeded");
    assert_eq!(status.as_deref(), Some("RESOURCE_EXHAUSTED"));
    assert_eq!(
        ProviderErrorKind::classify_http(429, status.as_deref()),
        ProviderErrorKind::RateLimited
    );
}

#[test]
fn parse_finish_reason_maps_expected_values() {
    assert_eq!(parse_finish_reason(Some("STOP")), GeminiFinishReason::Stop);
    assert_eq!(
        parse_finish_reason(Some("MAX_TOKENS")),
        GeminiFinishReason::MaxTokens
    );
    assert_eq!(
        parse_finish_reason(Some("SAFETY")),
        GeminiFinishReason::Safety
    );
    assert_eq!(parse_finish_reason(None), GeminiFinishReason::Other);
}
