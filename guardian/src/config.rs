//! Process configuration, read from flags with environment fallbacks.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::{ChainSet, GenerationOptions, ModelChain, ProviderError, TimeoutPolicy, Turn};

pub const DEFAULT_TEXT_CHAIN: &str = "gemini:gemini-1.5-flash,gemini:gemini-1.5-flash-8b";
pub const DEFAULT_VISION_CHAIN: &str = "gemini:gemini-1.5-pro,gemini:gemini-2.0-flash";
pub const DEFAULT_PERSONA: &str = "You are Guardian, a warm and patient companion. \
Reply in plain, friendly language, keep answers short, and ask a gentle follow-up question \
when it helps the conversation along.";

/// Status returned when every attempted model timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeoutStatus {
    /// 504 Gateway Timeout.
    Distinct,
    /// 502 Bad Gateway, like any other exhausted chain.
    Folded,
}

#[derive(Clone, Parser)]
#[command(
    name = "guardian",
    about = "Conversational relay with ordered model fallback",
    args_override_self = true
)]
pub struct Config {
    #[arg(long, env = "PORT", default_value_t = 10000)]
    pub port: u16,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    /// OpenAI-compatible root of an Ollama server; Ollama stays disabled when unset.
    #[arg(long, env = "OLLAMA_BASE_URL")]
    pub ollama_base_url: Option<String>,

    /// Comma separated `provider:model` targets tried in order for text turns.
    #[arg(long, env = "TEXT_CHAIN", default_value = DEFAULT_TEXT_CHAIN)]
    pub text_chain: String,

    /// Comma separated `provider:model` targets tried in order for turns with an image.
    #[arg(long, env = "VISION_CHAIN", default_value = DEFAULT_VISION_CHAIN)]
    pub vision_chain: String,

    /// Rolling turns kept per session, excluding the persona preamble.
    #[arg(long, env = "HISTORY_WINDOW", default_value_t = 40)]
    pub history_window: usize,

    /// Live sessions kept in memory; the least recently used one is dropped past this.
    #[arg(long, env = "MAX_SESSIONS", default_value_t = gchat::DEFAULT_MAX_SESSIONS)]
    pub max_sessions: usize,

    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value_t = 30)]
    pub provider_timeout_secs: u64,

    #[arg(long, env = "TEMPERATURE", default_value_t = 0.9)]
    pub temperature: f32,

    #[arg(long, env = "TOP_P", default_value_t = 0.95)]
    pub top_p: f32,

    #[arg(long, env = "MAX_OUTPUT_TOKENS", default_value_t = 1024)]
    pub max_output_tokens: u32,

    #[arg(long, env = "PERSONA", default_value = DEFAULT_PERSONA)]
    pub persona: String,

    /// Assistant turn placed after the persona in every session preamble.
    #[arg(long, env = "PERSONA_ACK")]
    pub persona_ack: Option<String>,

    #[arg(long, env = "TIMEOUT_STATUS", value_enum, default_value_t = TimeoutStatus::Distinct)]
    pub timeout_status: TimeoutStatus,

    /// Stop the chain on the first timeout instead of trying the next model.
    #[arg(long, env = "TIMEOUTS_FATAL", default_value_t = false)]
    pub timeouts_fatal: bool,

    /// Block threshold (for example `BLOCK_NONE`) sent to Gemini for every harm category.
    #[arg(long, env = "GEMINI_SAFETY_THRESHOLD")]
    pub gemini_safety_threshold: Option<String>,
}

impl Config {
    pub fn bind_address(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn chain_set(&self) -> Result<ChainSet, ProviderError> {
        ChainSet::new(
            ModelChain::parse(&self.text_chain)?,
            ModelChain::parse(&self.vision_chain)?,
        )
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions::default()
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_max_output_tokens(self.max_output_tokens)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        if self.timeouts_fatal {
            TimeoutPolicy::Fatal
        } else {
            TimeoutPolicy::Transient
        }
    }

    pub fn preamble(&self) -> Vec<Turn> {
        gchat::persona_preamble(&self.persona, self.persona_ack.as_deref())
    }
}
