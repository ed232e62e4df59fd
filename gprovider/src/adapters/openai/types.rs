//! OpenAI adapter types and provider-agnostic conversion logic.

use std::fmt::Formatter;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{
    ContentPart, ModelRequest, ModelResponse, ProviderError, ProviderId, Role, SecretString,
    StopReason, TokenUsage, Turn,
};

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl From<ModelRequest> for OpenAiRequest {
    fn from(value: ModelRequest) -> Self {
        Self {
            model: value.model,
            messages: value.turns.iter().map(OpenAiMessage::from).collect(),
            temperature: value.options.temperature,
            top_p: value.options.top_p,
            max_tokens: value.options.max_output_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiMessage {
    pub role: OpenAiRole,
    pub content: Vec<OpenAiContent>,
}

impl OpenAiMessage {
    pub fn has_image(&self) -> bool {
        self.content
            .iter()
            .any(|part| matches!(part, OpenAiContent::ImageUrl(_)))
    }

    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                OpenAiContent::Text(text) => Some(text.as_str()),
                OpenAiContent::ImageUrl(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<&Turn> for OpenAiMessage {
    fn from(value: &Turn) -> Self {
        Self {
            role: value.role().into(),
            content: value.parts().iter().map(OpenAiContent::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiContent {
    Text(String),
    /// `data:` URL carrying the base64 image inline.
    ImageUrl(String),
}

impl From<&ContentPart> for OpenAiContent {
    fn from(value: &ContentPart) -> Self {
        match value {
            ContentPart::Text(text) => Self::Text(text.clone()),
            ContentPart::InlineImage { mime_type, data } => {
                Self::ImageUrl(format!("data:{mime_type};base64,{}", STANDARD.encode(data)))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiRole {
    System,
    User,
    Assistant,
}

impl OpenAiRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl From<Role> for OpenAiRole {
    fn from(value: Role) -> Self {
        match value {
            Role::System => Self::System,
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiResponse {
    pub model: String,
    pub content: String,
    pub finish_reason: OpenAiFinishReason,
    pub usage: OpenAiUsage,
}

impl OpenAiResponse {
    /// Maps the wire response onto the shared model, rejecting replies with no text.
    pub(crate) fn into_model_response(
        self,
        provider: ProviderId,
    ) -> Result<ModelResponse, ProviderError> {
        if self.content.trim().is_empty() {
            return Err(match self.finish_reason {
                OpenAiFinishReason::ContentFilter => {
                    ProviderError::content_policy(format!("{} reply was filtered", self.model))
                }
                _ => ProviderError::other(format!("{} returned an empty reply", self.model)),
            });
        }

        Ok(ModelResponse {
            provider,
            model: self.model,
            text: self.content,
            stop_reason: self.finish_reason.into(),
            usage: self.usage.into(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiFinishReason {
    Stop,
    Length,
    ContentFilter,
    Other,
}

impl From<OpenAiFinishReason> for StopReason {
    fn from(value: OpenAiFinishReason) -> Self {
        match value {
            OpenAiFinishReason::Stop => Self::EndTurn,
            OpenAiFinishReason::Length => Self::MaxTokens,
            OpenAiFinishReason::ContentFilter => Self::ContentFilter,
            OpenAiFinishReason::Other => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenAiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl From<OpenAiUsage> for TokenUsage {
    fn from(value: OpenAiUsage) -> Self {
        Self {
            input_tokens: value.prompt_tokens,
            output_tokens: value.completion_tokens,
            total_tokens: value.total_tokens,
        }
    }
}

/// Local OpenAI-compatible servers (Ollama) accept unauthenticated calls.
#[derive(Clone, PartialEq, Eq)]
pub enum OpenAiAuth {
    ApiKey(SecretString),
    Anonymous,
}

impl std::fmt::Debug for OpenAiAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("OpenAiAuth::ApiKey([REDACTED])"),
            Self::Anonymous => f.write_str("OpenAiAuth::Anonymous"),
        }
    }
}
