//! Common imports for guardian applications and tests.

pub use crate::config::{Config, TimeoutStatus};
pub use crate::http::{AppState, router};
pub use crate::runtime::{RuntimeBundle, build_runtime, build_runtime_with, default_hooks};
pub use crate::{
    ChainSet, ChatError, ChatErrorKind, ChatService, ChatTurnRequest, ChatTurnResult, ContentPart,
    ConversationStore, FallbackExecutor, InMemoryConversationStore, ModelChain, ModelProvider,
    ModelRequest, ModelResponse, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId,
    ProviderRegistry, Role, SessionId, Turn,
};
