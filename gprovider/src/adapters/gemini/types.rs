//! Gemini adapter types and provider-agnostic conversion logic.

use crate::{
    ContentPart, ModelRequest, ModelResponse, ProviderId, Role, StopReason, TokenUsage, Turn,
};

/// Harm categories that receive the configured safety threshold.
pub const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Clone, PartialEq)]
pub struct GeminiRequest {
    pub model: String,
    pub system_instruction: Option<String>,
    pub contents: Vec<GeminiContent>,
    pub generation: GeminiGenerationConfig,
    pub safety_threshold: Option<String>,
}

impl From<ModelRequest> for GeminiRequest {
    fn from(value: ModelRequest) -> Self {
        let system_instruction = value.system_text();
        let contents = value
            .turns
            .iter()
            .filter_map(GeminiContent::from_turn)
            .collect();

        Self {
            model: value.model,
            system_instruction,
            contents,
            generation: GeminiGenerationConfig {
                temperature: value.options.temperature,
                top_p: value.options.top_p,
                max_output_tokens: value.options.max_output_tokens,
            },
            safety_threshold: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeminiGenerationConfig {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl GeminiGenerationConfig {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.top_p.is_none() && self.max_output_tokens.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiContent {
    pub role: GeminiRole,
    pub parts: Vec<GeminiPart>,
}

impl GeminiContent {
    /// System turns travel as `systemInstruction`, so they map to nothing here.
    fn from_turn(turn: &Turn) -> Option<Self> {
        let role = match turn.role() {
            Role::System => return None,
            Role::User => GeminiRole::User,
            Role::Assistant => GeminiRole::Model,
        };

        Some(Self {
            role,
            parts: turn.parts().iter().map(GeminiPart::from).collect(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiRole {
    User,
    Model,
}

impl GeminiRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeminiPart {
    Text(String),
    InlineData { mime_type: String, data: Vec<u8> },
}

impl From<&ContentPart> for GeminiPart {
    fn from(value: &ContentPart) -> Self {
        match value {
            ContentPart::Text(text) => Self::Text(text.clone()),
            ContentPart::InlineImage { mime_type, data } => Self::InlineData {
                mime_type: mime_type.clone(),
                data: data.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiResponse {
    pub model: String,
    pub text: String,
    pub finish_reason: GeminiFinishReason,
    pub usage: GeminiUsage,
}

impl GeminiResponse {
    pub(crate) fn into_model_response(self) -> ModelResponse {
        ModelResponse {
            provider: ProviderId::Gemini,
            model: self.model,
            text: self.text,
            stop_reason: self.finish_reason.into(),
            usage: self.usage.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiFinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
}

impl From<GeminiFinishReason> for StopReason {
    fn from(value: GeminiFinishReason) -> Self {
        match value {
            GeminiFinishReason::Stop => Self::EndTurn,
            GeminiFinishReason::MaxTokens => Self::MaxTokens,
            GeminiFinishReason::Safety => Self::ContentFilter,
            GeminiFinishReason::Other => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeminiUsage {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
    pub total_token_count: u32,
}

impl From<GeminiUsage> for TokenUsage {
    fn from(value: GeminiUsage) -> Self {
        Self {
            input_tokens: value.prompt_token_count,
            output_tokens: value.candidates_token_count,
            total_tokens: value.total_token_count,
        }
    }
}
