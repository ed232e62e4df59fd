//! Gemini `generateContent` payload serde models and conversion helpers.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::ProviderError;

use super::types::{
    GeminiContent, GeminiFinishReason, GeminiPart, GeminiRequest, GeminiResponse, GeminiUsage,
    HARM_CATEGORIES,
};

pub(crate) fn build_api_request(request: GeminiRequest) -> Result<GeminiApiRequest, ProviderError> {
    if request.contents.is_empty() {
        return Err(ProviderError::invalid_request(
            "Gemini request requires at least one content entry",
        ));
    }

    let contents = request
        .contents
        .into_iter()
        .map(GeminiApiContent::from)
        .collect::<Vec<_>>();

    let system_instruction = request.system_instruction.map(|text| GeminiApiContent {
        role: None,
        parts: vec![GeminiApiPart::text(text)],
    });

    let generation_config = (!request.generation.is_empty()).then(|| GeminiApiGenerationConfig {
        temperature: request.generation.temperature,
        top_p: request.generation.top_p,
        max_output_tokens: request.generation.max_output_tokens,
    });

    let safety_settings = request
        .safety_threshold
        .map(|threshold| {
            HARM_CATEGORIES
                .iter()
                .map(|category| GeminiApiSafetySetting {
                    category: (*category).to_string(),
                    threshold: threshold.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(GeminiApiRequest {
        contents,
        system_instruction,
        generation_config,
        safety_settings,
    })
}

pub(crate) fn parse_finish_reason(value: Option<&str>) -> GeminiFinishReason {
    match value {
        Some("STOP") => GeminiFinishReason::Stop,
        Some("MAX_TOKENS") => GeminiFinishReason::MaxTokens,
        Some("SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" | "SPII") => GeminiFinishReason::Safety,
        _ => GeminiFinishReason::Other,
    }
}

/// Message plus the Google RPC status name (`RESOURCE_EXHAUSTED`), when present.
pub(crate) fn extract_error(body: &str) -> Option<(String, Option<String>)> {
    let parsed = serde_json::from_str::<GeminiApiErrorEnvelope>(body).ok()?;
    Some((parsed.error.message, parsed.error.status))
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiErrorEnvelope {
    pub error: GeminiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiRequest {
    pub contents: Vec<GeminiApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GeminiApiGenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safety_settings: Vec<GeminiApiSafetySetting>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<GeminiApiPart>,
}

impl From<GeminiContent> for GeminiApiContent {
    fn from(value: GeminiContent) -> Self {
        Self {
            role: Some(value.role.as_str().to_string()),
            parts: value.parts.into_iter().map(GeminiApiPart::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<GeminiApiBlob>,
}

impl GeminiApiPart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }
}

impl From<GeminiPart> for GeminiApiPart {
    fn from(value: GeminiPart) -> Self {
        match value {
            GeminiPart::Text(text) => Self::text(text),
            GeminiPart::InlineData { mime_type, data } => Self {
                text: None,
                inline_data: Some(GeminiApiBlob {
                    mime_type,
                    data: STANDARD.encode(data),
                }),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiBlob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiApiSafetySetting {
    pub category: String,
    pub threshold: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiApiCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<GeminiApiPromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<GeminiApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiCandidate {
    #[serde(default)]
    pub content: Option<GeminiApiCandidateContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiApiCandidatePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiApiCandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiPromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiApiUsage {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

impl GeminiApiResponse {
    /// Converts a successful HTTP body; blocked prompts and empty candidate lists are
    /// content-policy failures.
    pub(crate) fn into_response(self, model: String) -> Result<GeminiResponse, ProviderError> {
        if let Some(reason) = self
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(ProviderError::content_policy(format!(
                "Gemini blocked the prompt: {reason}"
            )));
        }

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            ProviderError::content_policy("Gemini response did not include candidates")
        })?;

        let finish_reason = parse_finish_reason(candidate.finish_reason.as_deref());
        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(match finish_reason {
                GeminiFinishReason::Safety => {
                    ProviderError::content_policy("Gemini withheld the reply for safety")
                }
                _ => ProviderError::other("Gemini returned an empty reply"),
            });
        }

        let usage = self
            .usage_metadata
            .map(|usage| GeminiUsage {
                prompt_token_count: usage.prompt_token_count,
                candidates_token_count: usage.candidates_token_count,
                total_token_count: usage.total_token_count,
            })
            .unwrap_or_default();

        Ok(GeminiResponse {
            model,
            text,
            finish_reason,
            usage,
        })
    }
}
