mod provider;
mod serde_api;
mod tests;
mod transport;
mod types;

pub use provider::GeminiProvider;
pub use transport::{GEMINI_BASE_URL, GeminiHttpTransport, GeminiTransport};
pub use types::{
    GeminiContent, GeminiFinishReason, GeminiGenerationConfig, GeminiPart, GeminiRequest,
    GeminiResponse, GeminiRole, GeminiUsage, HARM_CATEGORIES,
};
