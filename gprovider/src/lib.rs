//! Provider abstraction, model chains, and ordered multi-model fallback.
//!
//! ```rust
//! use gprovider::{ChainSet, ModelChain, ProviderRegistry, Turn};
//!
//! let chains = ChainSet::new(
//!     ModelChain::parse("gemini:gemini-1.5-flash").expect("text chain"),
//!     ModelChain::parse("gemini:gemini-1.5-pro").expect("vision chain"),
//! )
//! .expect("chains should be disjoint");
//!
//! let registry = ProviderRegistry::new();
//! assert!(registry.ensure_configured(chains.text()).is_err());
//!
//! let turn = Turn::user_text("hello");
//! assert!(!turn.has_image());
//! ```

mod chain;
mod credentials;
mod error;
mod fallback;
mod model;
mod provider;
mod registry;

pub mod adapters;
pub mod prelude;

pub use chain::{ChainKind, ChainSet, ModelChain, ModelTarget};
pub use credentials::{SecretString, SecureCredentialManager};
pub use error::{FailureClass, ProviderError, ProviderErrorKind};
pub use fallback::{
    ChainFailure, ChainSuccess, DEFAULT_CALL_TIMEOUT, FailedAttempt, FallbackExecutor,
    FallbackHooks, NoopFallbackHooks, ProviderOutcome, TimeoutPolicy,
};
pub use gcommon::{BoxFuture, GenerationOptions};
pub use model::{
    ContentPart, ModelRequest, ModelRequestBuilder, ModelResponse, ProviderId, Role, StopReason,
    TokenUsage, Turn,
};
pub use provider::{ModelProvider, ProviderFuture};
pub use registry::ProviderRegistry;
