mod auth;
mod provider;
mod serde_api;
mod transport;
mod types;

pub use provider::OpenAiProvider;
pub use transport::{OPENAI_BASE_URL, OpenAiHttpTransport, OpenAiTransport};
pub use types::{
    OpenAiAuth, OpenAiContent, OpenAiFinishReason, OpenAiMessage, OpenAiRequest, OpenAiResponse,
    OpenAiRole, OpenAiUsage,
};
