// Backend-agnostic request type and backend selection

use std::time::Duration;

/// Prompts sent to whichever backend is active
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Tone and safety guidance
    pub system_prompt: String,

    /// Conversation context plus reply instruction
    pub user_prompt: String,
}

impl GenerationRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }
}

/// Settings for the hosted inference API
#[derive(Debug, Clone, PartialEq)]
pub struct HostedApiConfig {
    pub api_key: String,
    pub model_id: String,
    /// e.g. "https://api-inference.huggingface.co/models"
    pub base_url: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout: Duration,
}

impl HostedApiConfig {
    /// Full URL for the configured model
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.model_id)
    }
}

/// Settings for a locally reachable generation server
#[derive(Debug, Clone, PartialEq)]
pub struct LocalServerConfig {
    /// e.g. "http://localhost:11434"
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

/// Which generation backend to use, chosen once at startup
#[derive(Debug, Clone, PartialEq)]
pub enum BackendSelection {
    HostedApi(HostedApiConfig),
    LocalServer(LocalServerConfig),
    FallbackOnly,
}

impl BackendSelection {
    /// Provider name as reported by health/config endpoints
    pub fn provider_name(&self) -> &'static str {
        match self {
            BackendSelection::HostedApi(_) => "huggingface-api",
            BackendSelection::LocalServer(_) => "ollama",
            BackendSelection::FallbackOnly => "fallback",
        }
    }
}
