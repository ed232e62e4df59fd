//! Ordered model chains and chain selection.
//!
//! ```rust
//! use gprovider::{ChainKind, ChainSet, ContentPart, ModelChain};
//!
//! let chains = ChainSet::new(
//!     ModelChain::parse("gemini:gemini-1.5-flash,openai:gpt-4o-mini").unwrap(),
//!     ModelChain::parse("gemini:gemini-1.5-pro").unwrap(),
//! )
//! .unwrap();
//!
//! let (kind, chain) = chains.select(&[ContentPart::image("image/jpeg", vec![1])]);
//! assert_eq!(kind, ChainKind::Vision);
//! assert_eq!(chain.len(), 1);
//! ```

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::{ContentPart, ProviderError, ProviderId};

/// One chain entry: a provider plus the model identifier sent to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelTarget {
    pub provider: ProviderId,
    pub model: String,
}

impl ModelTarget {
    pub fn new(provider: ProviderId, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

impl Display for ModelTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

impl FromStr for ModelTarget {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (provider, model) = value.trim().split_once(':').ok_or_else(|| {
            ProviderError::invalid_request(format!(
                "model target '{value}' must look like 'provider:model'"
            ))
        })?;

        let model = model.trim();
        if model.is_empty() {
            return Err(ProviderError::invalid_request(format!(
                "model target '{value}' has an empty model name"
            )));
        }

        Ok(Self::new(provider.parse()?, model))
    }
}

/// Non-empty, immutable, ordered list of model targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelChain {
    targets: Vec<ModelTarget>,
}

impl ModelChain {
    pub fn new(targets: Vec<ModelTarget>) -> Result<Self, ProviderError> {
        if targets.is_empty() {
            return Err(ProviderError::invalid_request(
                "model chain must contain at least one model",
            ));
        }

        for (index, target) in targets.iter().enumerate() {
            if targets[..index].contains(target) {
                return Err(ProviderError::invalid_request(format!(
                    "model chain lists '{target}' more than once"
                )));
            }
        }

        Ok(Self { targets })
    }

    /// Parses a comma separated list such as `gemini:gemini-1.5-flash,openai:gpt-4o-mini`.
    pub fn parse(value: &str) -> Result<Self, ProviderError> {
        let targets = value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ModelTarget::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(targets)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelTarget> {
        self.targets.iter()
    }

    pub fn targets(&self) -> &[ModelTarget] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn shares_target_with(&self, other: &ModelChain) -> Option<&ModelTarget> {
        self.targets.iter().find(|target| other.targets.contains(target))
    }
}

impl Display for ModelChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .targets
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        f.write_str(&joined)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    Text,
    Vision,
}

impl ChainKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Vision => "vision",
        }
    }
}

/// The text and vision chains a service chooses between on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSet {
    text: ModelChain,
    vision: ModelChain,
}

impl ChainSet {
    pub fn new(text: ModelChain, vision: ModelChain) -> Result<Self, ProviderError> {
        if let Some(shared) = text.shares_target_with(&vision) {
            return Err(ProviderError::invalid_request(format!(
                "text and vision chains must not share '{shared}'"
            )));
        }

        Ok(Self { text, vision })
    }

    pub fn text(&self) -> &ModelChain {
        &self.text
    }

    pub fn vision(&self) -> &ModelChain {
        &self.vision
    }

    pub fn select(&self, parts: &[ContentPart]) -> (ChainKind, &ModelChain) {
        if parts.iter().any(ContentPart::is_image) {
            (ChainKind::Vision, &self.vision)
        } else {
            (ChainKind::Text, &self.text)
        }
    }
}
