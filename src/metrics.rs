// Prometheus metrics for the chat pipeline

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Process-wide metrics
pub static METRICS: Lazy<PipelineMetrics> = Lazy::new(PipelineMetrics::new);

pub struct PipelineMetrics {
    registry: Registry,
    /// Completed chat requests, by risk level
    pub chat_requests: IntCounterVec,
    /// Replies served from the crisis branch
    pub crisis_responses: IntCounter,
    /// Template replies, by reason
    pub generation_fallbacks: IntCounterVec,
    /// Messages rejected before the pipeline ran
    pub validation_rejections: IntCounter,
    /// Classifications that ended in the NEUTRAL sentinel
    pub sentiment_fallbacks: IntCounter,
}

impl PipelineMetrics {
    fn new() -> Self {
        let registry = Registry::new_custom(Some("solace".to_string()), None)
            .expect("Failed to create metrics registry");

        let chat_requests = IntCounterVec::new(
            Opts::new("chat_requests_total", "Chat requests processed"),
            &["risk_level"],
        )
        .expect("Failed to define chat_requests_total");
        let crisis_responses = IntCounter::new(
            "crisis_responses_total",
            "Replies served from the crisis branch",
        )
        .expect("Failed to define crisis_responses_total");
        let generation_fallbacks = IntCounterVec::new(
            Opts::new("generation_fallbacks_total", "Template replies used instead of generated text"),
            &["reason"],
        )
        .expect("Failed to define generation_fallbacks_total");
        let validation_rejections = IntCounter::new(
            "validation_rejections_total",
            "Messages rejected before the pipeline ran",
        )
        .expect("Failed to define validation_rejections_total");
        let sentiment_fallbacks = IntCounter::new(
            "sentiment_fallbacks_total",
            "Classifications that fell back to the neutral sentinel",
        )
        .expect("Failed to define sentiment_fallbacks_total");

        for collector in [
            Box::new(chat_requests.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(crisis_responses.clone()),
            Box::new(generation_fallbacks.clone()),
            Box::new(validation_rejections.clone()),
            Box::new(sentiment_fallbacks.clone()),
        ] {
            if let Err(e) = registry.register(collector) {
                tracing::warn!("Failed to register metric: {}", e);
            }
        }

        Self {
            registry,
            chat_requests,
            crisis_responses,
            generation_fallbacks,
            validation_rejections,
            sentiment_fallbacks,
        }
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output was not UTF-8")
    }
}
