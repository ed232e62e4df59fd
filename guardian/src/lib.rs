//! Conversational relay over an ordered chain of model providers.
//!
//! This crate is the single dependency for running the relay. It re-exports the
//! workspace crates and adds configuration, provider construction, runtime wiring
//! and the HTTP surface used by the `guardian` binary.
//!
//! ```rust
//! use clap::Parser;
//! use guardian::config::Config;
//! use guardian::runtime::build_runtime_with;
//! use guardian::ProviderRegistry;
//!
//! let config = Config::try_parse_from(["guardian", "--history-window", "8"]).unwrap();
//! let runtime = build_runtime_with(ProviderRegistry::new(), &config).unwrap();
//! assert_eq!(runtime.store.capacity(), 8);
//! ```

pub mod config;
pub mod http;
pub mod prelude;
pub mod providers;
pub mod runtime;

pub use gchat;
pub use gcommon;
pub use gobserve;
pub use gprovider;

pub use gchat::{
    ChatError, ChatErrorKind, ChatService, ChatTurnRequest, ChatTurnResult, ConversationHistory,
    ConversationStore, InMemoryConversationStore, SessionHistory, persona_preamble,
};
pub use gcommon::{BoxFuture, GenerationOptions, SessionId};
pub use gobserve::{
    CompositeFallbackHooks, MetricsObservabilityHooks, SafeFallbackHooks,
    TracingObservabilityHooks,
};
pub use gprovider::{
    ChainFailure, ChainKind, ChainSet, ChainSuccess, ContentPart, FailedAttempt, FallbackExecutor,
    FallbackHooks, ModelChain, ModelProvider, ModelRequest, ModelResponse, ModelTarget,
    ProviderError, ProviderErrorKind, ProviderFuture, ProviderId, ProviderRegistry, Role,
    SecureCredentialManager, StopReason, TimeoutPolicy, TokenUsage, Turn,
};
