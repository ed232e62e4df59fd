//! Provider-agnostic turn, request, and response model types.
//!
//! ```rust
//! use gprovider::{ContentPart, ModelRequest, ProviderErrorKind, Turn};
//!
//! let ok = ModelRequest::new_validated(
//!     "gemini-1.5-flash",
//!     vec![Turn::user(vec![ContentPart::text("Summarize this page")])],
//! );
//! assert!(ok.is_ok());
//!
//! let err = ModelRequest::new_validated("", vec![Turn::user(vec![ContentPart::text("hi")])])
//!     .err()
//!     .expect("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use gcommon::GenerationOptions;

use crate::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Gemini,
    OpenAi,
    Ollama,
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
            Self::Ollama => "ollama",
        };

        f.write_str(id)
    }
}

impl FromStr for ProviderId {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ProviderError::invalid_request(format!(
                "unknown provider '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineImage { mime_type: String, data: Vec<u8> },
}

impl ContentPart {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn image(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::InlineImage {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::InlineImage { .. })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::InlineImage { .. } => None,
        }
    }

    /// A part is empty when it carries nothing a model could read.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::InlineImage { data, .. } => data.is_empty(),
        }
    }
}

/// One role-tagged contribution to a conversation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    parts: Vec<ContentPart>,
}

impl Turn {
    /// Persona preamble; always exactly one text part.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            parts: vec![ContentPart::text(text)],
        }
    }

    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentPart::text(text)])
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            parts: vec![ContentPart::text(text)],
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    pub fn has_image(&self) -> bool {
        self.parts.iter().any(ContentPart::is_image)
    }

    /// Concatenated text parts, ignoring images.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ContentFilter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResponse {
    pub provider: ProviderId,
    pub model: String,
    pub text: String,
    pub stop_reason: StopReason,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub options: GenerationOptions,
}

impl ModelRequest {
    pub fn builder(model: impl Into<String>) -> ModelRequestBuilder {
        ModelRequestBuilder::new(model)
    }

    pub fn new(model: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            turns,
            options: GenerationOptions::default(),
        }
    }

    pub fn new_validated(model: impl Into<String>, turns: Vec<Turn>) -> Result<Self, ProviderError> {
        let request = Self::new(model, turns);
        request.validate()?;
        Ok(request)
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn system_text(&self) -> Option<String> {
        let system = self
            .turns
            .iter()
            .filter(|turn| turn.role() == Role::System)
            .map(Turn::text)
            .collect::<Vec<_>>();

        if system.is_empty() {
            None
        } else {
            Some(system.join("\n\n"))
        }
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if !self.turns.iter().any(|turn| turn.role() != Role::System) {
            return Err(ProviderError::invalid_request(
                "at least one non-system turn is required",
            ));
        }

        if let Some(max_output_tokens) = self.options.max_output_tokens
            && max_output_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_output_tokens must be greater than zero",
            ));
        }

        if let Some(temperature) = self.options.temperature
            && !(0.0..=2.0).contains(&temperature)
        {
            return Err(ProviderError::invalid_request(
                "temperature must be in the inclusive range 0.0..=2.0",
            ));
        }

        if let Some(top_p) = self.options.top_p
            && !(0.0..=1.0).contains(&top_p)
        {
            return Err(ProviderError::invalid_request(
                "top_p must be in the inclusive range 0.0..=1.0",
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestBuilder {
    model: String,
    turns: Vec<Turn>,
    options: GenerationOptions,
}

impl ModelRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            turns: Vec::new(),
            options: GenerationOptions::default(),
        }
    }

    pub fn turn(mut self, turn: Turn) -> Self {
        self.turns.push(turn);
        self
    }

    pub fn turns(mut self, turns: Vec<Turn>) -> Self {
        self.turns.extend(turns);
        self
    }

    pub fn options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<ModelRequest, ProviderError> {
        let request = ModelRequest {
            model: self.model,
            turns: self.turns,
            options: self.options,
        };

        request.validate()?;
        Ok(request)
    }
}
