// Solace - HTTP gateway
// Thin axum layer over the chat pipeline

mod handlers;

pub use handlers::{create_router, health_check, metrics_endpoint, AppError};

use anyhow::{Context, Result};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::pipeline::ChatPipeline;

/// Main server structure, shared by all handlers
pub struct SolaceServer {
    /// Chat pipeline (classifier, assessor, generator)
    pipeline: Arc<ChatPipeline>,
    /// Resolved configuration
    config: Config,
    /// Provider name reported by /health
    llm_provider: String,
}

impl SolaceServer {
    pub fn new(config: Config, pipeline: ChatPipeline, llm_provider: impl Into<String>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config,
            llm_provider: llm_provider.into(),
        }
    }

    /// Start the HTTP server
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.socket_addr()?;

        let app = create_router(Arc::new(self)).layer(TraceLayer::new_for_http());

        tracing::info!("Starting Solace server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        axum::serve(listener, app).await.context("Server error")?;

        Ok(())
    }

    pub fn pipeline(&self) -> &Arc<ChatPipeline> {
        &self.pipeline
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn llm_provider(&self) -> &str {
        &self.llm_provider
    }
}
