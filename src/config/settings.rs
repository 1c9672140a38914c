// Configuration structs

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::conversation::CONTEXT_HISTORY_LIMIT;
use crate::errors::{ConfigError, MAX_MESSAGE_CHARS};
use crate::generator::MAX_REPLY_CHARS;
use crate::providers::{BackendSelection, HostedApiConfig, LocalServerConfig};
use crate::sentiment::onnx::DEFAULT_SENTIMENT_REPO;

pub const PROVIDER_HOSTED: &str = "huggingface-api";
pub const PROVIDER_LOCAL: &str = "ollama";
pub const PROVIDER_FALLBACK: &str = "fallback";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Alternate risk keyword table (JSON)
    pub risk_keywords_path: Option<PathBuf>,

    pub server: ServerConfig,
    pub generation: GenerationConfig,
    pub sentiment: SentimentConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address
            .parse()
            .map_err(|_| ConfigError::BindAddress(self.bind_address.clone()))
    }
}

/// Generation backend settings
///
/// Only the fields of the selected provider are used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// "huggingface-api", "ollama" or "fallback"
    pub provider: String,

    pub hf_api_key: Option<String>,
    pub hf_model_id: String,
    pub hf_base_url: String,
    pub max_new_tokens: u32,
    pub top_p: f32,
    pub hosted_timeout_secs: u64,

    pub ollama_url: String,
    pub ollama_model: String,
    pub local_timeout_secs: u64,

    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: PROVIDER_HOSTED.to_string(),
            hf_api_key: None,
            hf_model_id: "meta-llama/Llama-2-7b-chat-hf".to_string(),
            hf_base_url: "https://api-inference.huggingface.co/models".to_string(),
            max_new_tokens: 150,
            top_p: 0.9,
            hosted_timeout_secs: 10,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "mistral".to_string(),
            local_timeout_secs: 30,
            temperature: 0.7,
        }
    }
}

impl GenerationConfig {
    /// Pick the backend for this process
    ///
    /// Misconfiguration degrades to fallback-only instead of failing startup.
    pub fn resolve(&self) -> BackendSelection {
        match self.provider.trim().to_lowercase().as_str() {
            PROVIDER_HOSTED => match self.hf_api_key.as_deref().map(str::trim) {
                Some(key) if !key.is_empty() => BackendSelection::HostedApi(HostedApiConfig {
                    api_key: key.to_string(),
                    model_id: self.hf_model_id.clone(),
                    base_url: self.hf_base_url.clone(),
                    max_new_tokens: self.max_new_tokens,
                    temperature: self.temperature,
                    top_p: self.top_p,
                    timeout: Duration::from_secs(self.hosted_timeout_secs),
                }),
                _ => {
                    tracing::warn!("HF_API_KEY not set, using fallback responses only");
                    BackendSelection::FallbackOnly
                }
            },
            PROVIDER_LOCAL => BackendSelection::LocalServer(LocalServerConfig {
                url: self.ollama_url.clone(),
                model: self.ollama_model.clone(),
                temperature: self.temperature,
                timeout: Duration::from_secs(self.local_timeout_secs),
            }),
            PROVIDER_FALLBACK => BackendSelection::FallbackOnly,
            other => {
                tracing::warn!("Unknown LLM provider '{}', using fallback responses only", other);
                BackendSelection::FallbackOnly
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Hugging Face repo holding the ONNX export and tokenizer
    pub model_repo: String,

    /// Load the model at startup instead of on the first request
    pub preload: bool,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            model_repo: DEFAULT_SENTIMENT_REPO.to_string(),
            preload: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_message_chars: usize,
    pub history_limit: usize,
    pub max_reply_chars: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_chars: MAX_MESSAGE_CHARS,
            history_limit: CONTEXT_HISTORY_LIMIT,
            max_reply_chars: MAX_REPLY_CHARS,
        }
    }
}
