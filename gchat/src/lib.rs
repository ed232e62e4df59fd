//! Session-scoped conversation history and the turn commit protocol.
//!
//! ```rust
//! use gchat::{ConversationHistory, persona_preamble};
//! use gprovider::Turn;
//!
//! let mut history = ConversationHistory::new(persona_preamble("Be kind.", None), 2);
//! history.append(Turn::user_text("one"));
//! history.append(Turn::assistant("two"));
//! history.append(Turn::user_text("three"));
//!
//! assert_eq!(history.len(), 2);
//! assert_eq!(history.snapshot().len(), 3);
//! ```

mod error;
mod history;
mod service;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatService, ChatTurnRequest, ChatTurnResult,
        ConversationHistory, ConversationStore, InMemoryConversationStore, SessionHistory,
        persona_preamble,
    };
    pub use gcommon::SessionId;
}

pub use error::{ChatError, ChatErrorKind};
pub use history::{ConversationHistory, persona_preamble};
pub use service::ChatService;
pub use store::{
    ChatFuture, ConversationStore, DEFAULT_MAX_SESSIONS, InMemoryConversationStore, SessionHistory,
};
pub use types::{ChatTurnRequest, ChatTurnResult};
pub use gcommon::SessionId;
