use std::future::Future;
use std::pin::Pin;

use crate::{ModelRequest, ModelResponse, ProviderError, ProviderId};

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One provider endpoint family. Implementations map the uniform request onto their own
/// wire format, so callers never branch on provider identity.
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    fn complete<'a>(
        &'a self,
        request: ModelRequest,
    ) -> ProviderFuture<'a, Result<ModelResponse, ProviderError>>;
}
