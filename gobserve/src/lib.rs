//! Production-friendly observability hooks for the model fallback executor.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use gobserve::{
//!     CompositeFallbackHooks, MetricsObservabilityHooks, SafeFallbackHooks,
//!     TracingObservabilityHooks,
//! };
//!
//! let hooks = CompositeFallbackHooks::new()
//!     .with(Arc::new(SafeFallbackHooks::new(TracingObservabilityHooks)))
//!     .with(Arc::new(SafeFallbackHooks::new(MetricsObservabilityHooks)));
//! assert_eq!(hooks.len(), 2);
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsObservabilityHooks;
pub use safe_hooks::{CompositeFallbackHooks, SafeFallbackHooks};
pub use tracing_hooks::TracingObservabilityHooks;

pub mod prelude {
    pub use crate::{
        CompositeFallbackHooks, MetricsObservabilityHooks, SafeFallbackHooks,
        TracingObservabilityHooks,
    };
}
