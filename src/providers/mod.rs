// Text generation backends
//
// One backend is selected at startup from configuration. The response
// generator only sees the `GenerationBackend` trait; a missing backend
// means fallback-only operation.

use anyhow::Result;
use async_trait::async_trait;

pub mod types;

// Backend implementations
pub mod hosted;
pub mod local;

// Backend factory
pub mod factory;

pub use factory::create_backend;
pub use hosted::HostedApiBackend;
pub use local::LocalServerBackend;
pub use types::{BackendSelection, GenerationRequest, HostedApiConfig, LocalServerConfig};

/// Trait for text generation backends
///
/// A single attempt per call. Any error (transport, status, timeout, payload)
/// is reported as `Err` and the caller falls back to a template reply.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate raw reply text for the given prompts
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Backend name for logs and health reporting (e.g. "huggingface-api")
    fn name(&self) -> &str;
}
