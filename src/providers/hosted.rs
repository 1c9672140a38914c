// Hosted inference API backend (HuggingFace text-generation endpoint)

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::types::{GenerationRequest, HostedApiConfig};
use super::GenerationBackend;

/// Backend for a hosted Llama-2 chat model
#[derive(Clone)]
pub struct HostedApiBackend {
    client: Client,
    config: HostedApiConfig,
}

#[derive(Debug, Serialize)]
struct HostedRequest {
    inputs: String,
    parameters: HostedParameters,
}

#[derive(Debug, Serialize)]
struct HostedParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct HostedGeneration {
    #[serde(default)]
    generated_text: String,
}

impl HostedApiBackend {
    pub fn new(config: HostedApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Llama-2 chat prompt layout
    pub fn format_prompt(system_prompt: &str, user_prompt: &str) -> String {
        format!(
            "[INST] <<SYS>>\n{}\n<</SYS>>\n\n{}\n[/INST]",
            system_prompt, user_prompt
        )
    }

    fn to_hosted_request(&self, request: &GenerationRequest) -> HostedRequest {
        HostedRequest {
            inputs: Self::format_prompt(&request.system_prompt, &request.user_prompt),
            parameters: HostedParameters {
                max_new_tokens: self.config.max_new_tokens,
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            },
        }
    }
}

#[async_trait]
impl GenerationBackend for HostedApiBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let url = self.config.endpoint();
        let payload = self.to_hosted_request(request);

        tracing::debug!("Sending generation request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to hosted inference API")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Hosted inference API request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let generations: Vec<HostedGeneration> = response
            .json()
            .await
            .context("Failed to parse hosted inference API response")?;

        let generated = generations
            .into_iter()
            .next()
            .context("Hosted inference API returned no generations")?
            .generated_text;

        // Chat models echo the turn marker; keep only what follows it
        let text = generated
            .rsplit("Assistant:")
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(text)
    }

    fn name(&self) -> &str {
        "huggingface-api"
    }
}
