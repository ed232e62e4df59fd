//! OpenAI HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProviderError;

use super::types::{
    OpenAiContent, OpenAiFinishReason, OpenAiMessage, OpenAiRequest, OpenAiResponse, OpenAiUsage,
};

pub(crate) fn build_api_request(request: OpenAiRequest) -> Result<OpenAiApiRequest, ProviderError> {
    let messages = request
        .messages
        .into_iter()
        .map(OpenAiApiMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    if messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "OpenAI request requires at least one message",
        ));
    }

    Ok(OpenAiApiRequest {
        model: request.model,
        messages,
        temperature: request.temperature,
        top_p: request.top_p,
        max_tokens: request.max_tokens,
        stream: false,
    })
}

pub(crate) fn parse_finish_reason(value: Option<&str>) -> OpenAiFinishReason {
    match value {
        Some("stop") => OpenAiFinishReason::Stop,
        Some("length") => OpenAiFinishReason::Length,
        Some("content_filter") => OpenAiFinishReason::ContentFilter,
        _ => OpenAiFinishReason::Other,
    }
}

/// Message plus the most specific machine-readable code (`code`, else `type`).
pub(crate) fn extract_error(body: &str) -> Option<(String, Option<String>)> {
    let parsed = serde_json::from_str::<OpenAiApiErrorEnvelope>(body).ok()?;
    let code = parsed
        .error
        .code
        .as_ref()
        .and_then(Value::as_str)
        .map(str::to_string)
        .or(parsed.error.r#type);

    Some((parsed.error.message, code))
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiErrorEnvelope {
    pub error: OpenAiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiError {
    pub message: String,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: String,
    pub content: OpenAiApiContent,
}

/// Text-only messages stay plain strings so servers without vision support accept them.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum OpenAiApiContent {
    Text(String),
    Parts(Vec<OpenAiApiContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum OpenAiApiContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiApiImageUrl },
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiImageUrl {
    pub url: String,
}

impl TryFrom<OpenAiMessage> for OpenAiApiMessage {
    type Error = ProviderError;

    fn try_from(value: OpenAiMessage) -> Result<Self, Self::Error> {
        if value.content.is_empty() {
            return Err(ProviderError::invalid_request(
                "OpenAI message content must not be empty",
            ));
        }

        let content = if value.has_image() {
            OpenAiApiContent::Parts(
                value
                    .content
                    .into_iter()
                    .map(|part| match part {
                        OpenAiContent::Text(text) => OpenAiApiContentPart::Text { text },
                        OpenAiContent::ImageUrl(url) => OpenAiApiContentPart::ImageUrl {
                            image_url: OpenAiApiImageUrl { url },
                        },
                    })
                    .collect(),
            )
        } else {
            OpenAiApiContent::Text(value.text())
        };

        Ok(Self {
            role: value.role.as_str().to_string(),
            content,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiResponse {
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAiApiChoice>,
    pub usage: Option<OpenAiApiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiChoice {
    pub message: OpenAiApiAssistantMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiAssistantMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl TryFrom<OpenAiApiResponse> for OpenAiResponse {
    type Error = ProviderError;

    fn try_from(value: OpenAiApiResponse) -> Result<Self, Self::Error> {
        let choice =
            value.choices.into_iter().next().ok_or_else(|| {
                ProviderError::transport("OpenAI response did not include choices")
            })?;

        let usage = value
            .usage
            .map(|usage| OpenAiUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            })
            .unwrap_or_default();

        Ok(Self {
            model: value.model,
            content: choice.message.content.unwrap_or_default(),
            finish_reason: parse_finish_reason(choice.finish_reason.as_deref()),
            usage,
        })
    }
}
