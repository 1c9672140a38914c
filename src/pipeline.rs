// Chat pipeline - score, screen, then reply
//
// Received -> Scored -> RiskChecked -> {CrisisBranch | GenerateBranch} -> Assembled
//
// Validation happens when the incoming `Message` is built, so every message
// that reaches `process` has already passed the empty/length checks.

use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::conversation::{ConversationContext, Message, CONTEXT_HISTORY_LIMIT};
use crate::crisis::{crisis_message, RiskAssessment, RiskAssessor};
use crate::generator::{ReplySource, ResponseGenerator};
use crate::metrics::METRICS;
use crate::providers::{create_backend, BackendSelection};
use crate::sentiment::{
    OnnxSentimentScorer, SentimentClassifier, SentimentLabel, SentimentResult, SentimentScorer,
};

/// Characters of user text that may appear in logs
const LOG_PREVIEW_CHARS: usize = 100;

const EMPATHY_SUMMARY: &str = "User expressing difficult emotions - heightened empathy mode";
const SUPPORTIVE_SUMMARY: &str = "Conversation flowing normally - supportive mode";

/// Pipeline stage, used for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Scored,
    RiskChecked,
    CrisisBranch,
    GenerateBranch,
    Assembled,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Scored => "scored",
            Stage::RiskChecked => "risk_checked",
            Stage::CrisisBranch => "crisis_branch",
            Stage::GenerateBranch => "generate_branch",
            Stage::Assembled => "assembled",
        }
    }
}

/// Outcome of one chat turn
#[derive(Debug, Clone, Serialize)]
pub struct ChatResult {
    pub original_message: String,
    pub sentiment: SentimentResult,
    pub risk: RiskAssessment,
    pub reply: String,
    pub summary: String,
}

/// Conversation summary derived from the sentiment label alone
pub fn conversation_summary(label: SentimentLabel) -> &'static str {
    if label.is_negative() {
        EMPATHY_SUMMARY
    } else {
        SUPPORTIVE_SUMMARY
    }
}

/// Orchestrates classifier, assessor and generator for a single message
pub struct ChatPipeline {
    classifier: Arc<SentimentClassifier>,
    assessor: Arc<RiskAssessor>,
    generator: Arc<ResponseGenerator>,
    history_limit: usize,
}

impl ChatPipeline {
    pub fn new(
        classifier: Arc<SentimentClassifier>,
        assessor: Arc<RiskAssessor>,
        generator: Arc<ResponseGenerator>,
    ) -> Self {
        Self {
            classifier,
            assessor,
            generator,
            history_limit: CONTEXT_HISTORY_LIMIT,
        }
    }

    /// Wire classifier, assessor and generator from configuration
    ///
    /// `selection` is resolved once by the caller so the same backend is
    /// reported by /health and used for generation. The sentiment model is
    /// not loaded here.
    pub fn from_config(config: &Config, selection: &BackendSelection) -> Result<Self> {
        let model_repo = config.sentiment.model_repo.clone();
        let classifier = SentimentClassifier::lazy(move || {
            let scorer = OnnxSentimentScorer::load(&model_repo)?;
            Ok(Arc::new(scorer) as Arc<dyn SentimentScorer>)
        });

        let assessor = match &config.risk_keywords_path {
            Some(path) => RiskAssessor::load_from_file(path)?,
            None => RiskAssessor::default(),
        };

        let backend = create_backend(selection)?;
        tracing::info!("Generation provider: {}", selection.provider_name());
        let generator =
            ResponseGenerator::new(backend).with_max_reply_chars(config.limits.max_reply_chars);

        Ok(Self::new(Arc::new(classifier), Arc::new(assessor), Arc::new(generator))
            .with_history_limit(config.limits.history_limit))
    }

    /// Prior messages passed to generation
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit;
        self
    }

    pub fn classifier(&self) -> &Arc<SentimentClassifier> {
        &self.classifier
    }

    pub fn assessor(&self) -> &Arc<RiskAssessor> {
        &self.assessor
    }

    pub fn generator(&self) -> &Arc<ResponseGenerator> {
        &self.generator
    }

    /// Run one message through the pipeline; never fails
    pub async fn process(&self, message: &Message, history: &[Message]) -> ChatResult {
        let text = message.text();
        tracing::debug!(
            stage = Stage::Received.as_str(),
            preview = crate::sentiment::classifier::truncate_chars(text, LOG_PREVIEW_CHARS),
            "Message received"
        );

        let sentiment = self.classifier.classify(text).await;
        if sentiment.is_sentinel() {
            METRICS.sentiment_fallbacks.inc();
        }
        tracing::debug!(
            stage = Stage::Scored.as_str(),
            label = %sentiment.label,
            score = sentiment.score,
            "Sentiment scored"
        );

        let risk = self.assessor.assess(text);
        tracing::debug!(
            stage = Stage::RiskChecked.as_str(),
            risk_level = %risk.risk_level,
            is_high_risk = risk.is_high_risk,
            "Risk assessed"
        );

        let reply = if risk.is_high_risk {
            tracing::warn!(
                stage = Stage::CrisisBranch.as_str(),
                indicators = ?risk.indicators,
                "Crisis indicators detected, serving crisis resources"
            );
            METRICS.crisis_responses.inc();
            crisis_message().to_string()
        } else {
            tracing::debug!(
                stage = Stage::GenerateBranch.as_str(),
                backend = self.generator.backend_name(),
                history = history.len(),
                "Generating reply"
            );
            let context = ConversationContext::with_limit(history, self.history_limit);
            let reply = self
                .generator
                .generate_reply(text, sentiment.label, &context)
                .await;
            if let ReplySource::Fallback(reason) = reply.source {
                METRICS
                    .generation_fallbacks
                    .with_label_values(&[reason.as_str()])
                    .inc();
            }
            reply.text
        };

        METRICS
            .chat_requests
            .with_label_values(&[risk.risk_level.as_str()])
            .inc();

        let result = ChatResult {
            original_message: text.to_string(),
            summary: conversation_summary(sentiment.label).to_string(),
            sentiment,
            risk,
            reply,
        };
        tracing::debug!(stage = Stage::Assembled.as_str(), "Chat result assembled");

        result
    }
}
