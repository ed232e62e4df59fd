//! Chat turn request and result types.

use gcommon::SessionId;
use gprovider::{ChainKind, ContentPart, ProviderId, TokenUsage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnRequest {
    pub session_id: SessionId,
    pub parts: Vec<ContentPart>,
}

impl ChatTurnRequest {
    pub fn new(session_id: impl Into<SessionId>, parts: Vec<ContentPart>) -> Self {
        Self {
            session_id: session_id.into(),
            parts,
        }
    }

    pub fn text(session_id: impl Into<SessionId>, text: impl Into<String>) -> Self {
        Self::new(session_id, vec![ContentPart::text(text)])
    }

    pub fn with_part(mut self, part: ContentPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn has_image(&self) -> bool {
        self.parts.iter().any(ContentPart::is_image)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnResult {
    pub session_id: SessionId,
    pub reply: String,
    /// Model identifier of the chain entry that answered.
    pub model: String,
    pub provider: ProviderId,
    pub chain: ChainKind,
    /// Calls made for this turn, including the successful one.
    pub attempts: usize,
    pub usage: TokenUsage,
}
