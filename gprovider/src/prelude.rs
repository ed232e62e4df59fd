//! Common `gprovider` imports for downstream crates.

pub use crate::{
    ChainFailure, ChainKind, ChainSet, ChainSuccess, ContentPart, FailedAttempt, FallbackExecutor,
    FallbackHooks, ModelChain, ModelProvider, ModelRequest, ModelResponse, ModelTarget,
    NoopFallbackHooks, ProviderError, ProviderErrorKind, ProviderFuture, ProviderId,
    ProviderRegistry, Role, SecureCredentialManager, StopReason, TimeoutPolicy, TokenUsage, Turn,
};
pub use gcommon::{BoxFuture, GenerationOptions};
