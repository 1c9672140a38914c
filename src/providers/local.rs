// Local generation server backend (Ollama-compatible /api/generate)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::types::{GenerationRequest, LocalServerConfig};
use super::GenerationBackend;

/// Backend for a co-located generation server
#[derive(Clone)]
pub struct LocalServerBackend {
    client: Client,
    config: LocalServerConfig,
}

#[derive(Debug, Serialize)]
struct LocalRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct LocalResponse {
    response: String,
}

impl LocalServerBackend {
    pub fn new(config: LocalServerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!("Using local generation server: {}/api/generate", config.url);

        Ok(Self { client, config })
    }

    /// Plain-text turn layout understood by most local chat models
    pub fn format_prompt(system_prompt: &str, user_prompt: &str) -> String {
        format!("{}\n\nUser: {}\n\nAssistant:", system_prompt, user_prompt)
    }
}

#[async_trait]
impl GenerationBackend for LocalServerBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.config.url.trim_end_matches('/'));
        let payload = LocalRequest {
            model: &self.config.model,
            prompt: Self::format_prompt(&request.system_prompt, &request.user_prompt),
            stream: false,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Cannot connect to generation server at {}", self.config.url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Generation server error: {}", status);
        }

        let body: LocalResponse = response
            .json()
            .await
            .context("Failed to parse generation server response")?;

        Ok(body.response.trim().to_string())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
