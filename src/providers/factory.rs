// Backend factory
//
// Creates the generation backend chosen at startup

use anyhow::Result;

use super::hosted::HostedApiBackend;
use super::local::LocalServerBackend;
use super::types::BackendSelection;
use super::GenerationBackend;

/// Create a backend for the selection; `None` means fallback-only
pub fn create_backend(selection: &BackendSelection) -> Result<Option<Box<dyn GenerationBackend>>> {
    match selection {
        BackendSelection::HostedApi(config) => {
            let backend = HostedApiBackend::new(config.clone())?;
            Ok(Some(Box::new(backend)))
        }

        BackendSelection::LocalServer(config) => {
            let backend = LocalServerBackend::new(config.clone())?;
            Ok(Some(Box::new(backend)))
        }

        BackendSelection::FallbackOnly => {
            tracing::info!("No generation backend configured, using fallback responses only");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::{HostedApiConfig, LocalServerConfig};
    use std::time::Duration;

    #[test]
    fn test_create_hosted_backend() {
        let selection = BackendSelection::HostedApi(HostedApiConfig {
            api_key: "test-key".to_string(),
            model_id: "meta-llama/Llama-2-7b-chat-hf".to_string(),
            base_url: "https://api-inference.huggingface.co/models".to_string(),
            max_new_tokens: 150,
            temperature: 0.7,
            top_p: 0.9,
            timeout: Duration::from_secs(10),
        });

        let backend = create_backend(&selection).unwrap();
        assert_eq!(backend.unwrap().name(), "huggingface-api");
    }

    #[test]
    fn test_create_local_backend() {
        let selection = BackendSelection::LocalServer(LocalServerConfig {
            url: "http://localhost:11434".to_string(),
            model: "mistral".to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        });

        let backend = create_backend(&selection).unwrap();
        assert_eq!(backend.unwrap().name(), "ollama");
    }

    #[test]
    fn test_fallback_only_has_no_backend() {
        assert!(create_backend(&BackendSelection::FallbackOnly).unwrap().is_none());
    }
}
