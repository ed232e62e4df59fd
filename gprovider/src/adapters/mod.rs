#[cfg(feature = "provider-gemini")]
pub mod gemini;

#[cfg(feature = "provider-openai")]
pub mod openai;

#[cfg(feature = "provider-ollama")]
pub mod ollama;

/// Maps a reqwest failure from sending a request or reading its body.
#[cfg(any(feature = "provider-gemini", feature = "provider-openai"))]
pub(crate) fn request_error(err: reqwest::Error) -> crate::ProviderError {
    if err.is_timeout() {
        crate::ProviderError::timeout(err.to_string())
    } else {
        crate::ProviderError::transport(err.to_string())
    }
}
