// End-to-end pipeline scenarios
//
// The sentiment model and generation backend are replaced by mocks that
// count calls, so these run offline.

use anyhow::Result;
use solace::conversation::Message;
use solace::crisis::{crisis_message, RiskAssessor, RiskLevel, MAX_INDICATORS};
use solace::errors::ValidationError;
use solace::generator::{fallback_responses, ResponseGenerator, MAX_REPLY_CHARS};
use solace::pipeline::ChatPipeline;
use solace::providers::{GenerationBackend, GenerationRequest};
use solace::sentiment::{SentimentClassifier, SentimentLabel, SentimentResult, SentimentScorer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Scores anything containing a negative cue as NEGATIVE
struct KeywordScorer;

#[async_trait::async_trait]
impl SentimentScorer for KeywordScorer {
    async fn score(&self, text: &str) -> Result<SentimentResult> {
        let lower = text.to_lowercase();
        let negative = ["hopeless", "sad", "awful", "end my life"]
            .iter()
            .any(|cue| lower.contains(cue));
        Ok(if negative {
            SentimentResult::new(SentimentLabel::Negative, 0.97)
        } else {
            SentimentResult::new(SentimentLabel::Positive, 0.99)
        })
    }

    fn name(&self) -> &str {
        "keyword-mock"
    }
}

/// Backend that records calls and answers with a fixed reply or an error
struct MockBackend {
    reply: Option<String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => anyhow::bail!("connection refused"),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn pipeline_with(reply: Option<&str>) -> (ChatPipeline, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let backend = MockBackend {
        reply: reply.map(str::to_string),
        calls: Arc::clone(&calls),
    };
    let pipeline = ChatPipeline::new(
        Arc::new(SentimentClassifier::with_scorer(Arc::new(KeywordScorer))),
        Arc::new(RiskAssessor::default()),
        Arc::new(ResponseGenerator::new(Some(Box::new(backend))).with_seed(11)),
    );
    (pipeline, calls)
}

#[tokio::test]
async fn test_crisis_message_bypasses_generation() {
    let (pipeline, calls) = pipeline_with(Some("this should never be sent"));
    let message = Message::user("I feel hopeless and want to end my life").unwrap();

    let result = pipeline.process(&message, &[]).await;

    assert!(result.risk.is_high_risk);
    assert_eq!(result.risk.risk_level, RiskLevel::High);
    assert_eq!(result.reply, crisis_message());
    assert!(result.reply.contains("988"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(result.sentiment.label, SentimentLabel::Negative);
    assert_eq!(
        result.summary,
        "User expressing difficult emotions - heightened empathy mode"
    );
}

#[tokio::test]
async fn test_positive_message_gets_generated_reply() {
    let (pipeline, calls) = pipeline_with(Some("That's wonderful to hear! What made it so great?"));
    let message = Message::user("I had a great day today!").unwrap();

    let result = pipeline.process(&message, &[]).await;

    assert_eq!(result.sentiment.label, SentimentLabel::Positive);
    assert_eq!(result.risk.risk_level, RiskLevel::Low);
    assert!(!result.risk.is_high_risk);
    assert!(result.reply.chars().count() <= MAX_REPLY_CHARS);
    assert_eq!(result.reply, "That's wonderful to hear! What made it so great?");
    assert_eq!(result.summary, "Conversation flowing normally - supportive mode");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreachable_backend_uses_polarity_fallback() {
    let (pipeline, calls) = pipeline_with(None);

    let sad = Message::user("Everything feels awful lately").unwrap();
    let result = pipeline.process(&sad, &[]).await;
    assert!(fallback_responses(SentimentLabel::Negative).contains(&result.reply.as_str()));

    let happy = Message::user("I had a great day today!").unwrap();
    let result = pipeline.process(&happy, &[]).await;
    assert!(fallback_responses(SentimentLabel::Positive).contains(&result.reply.as_str()));

    // One attempt per message, no retries
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_medium_risk_still_generates() {
    let (pipeline, calls) = pipeline_with(Some("That sounds like a lot to carry."));
    let message = Message::user("I'm so overwhelmed and I think I'm having a breakdown").unwrap();

    let result = pipeline.process(&message, &[]).await;

    assert_eq!(result.risk.risk_level, RiskLevel::Medium);
    assert!(!result.risk.is_high_risk);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_indicators_capped_but_tier_kept() {
    let (pipeline, _) = pipeline_with(Some("unused"));
    let message = Message::user(
        "it's an emergency, right now, urgent, I need help immediately, \
         everything is hopeless and I want to kill myself",
    )
    .unwrap();

    let result = pipeline.process(&message, &[]).await;

    assert!(result.risk.indicators.len() <= MAX_INDICATORS);
    assert!(result.risk.is_high_risk);
    assert_eq!(result.risk.risk_level, RiskLevel::High);
}

#[tokio::test]
async fn test_history_is_passed_through() {
    let (pipeline, calls) = pipeline_with(Some("I'm glad the walk helped."));
    let history = vec![
        Message::user("I went for a walk").unwrap(),
        Message::assistant("How did it feel?"),
    ];
    let message = Message::user("It cleared my head").unwrap();

    let result = pipeline.process(&message, &history).await;

    assert_eq!(result.reply, "I'm glad the walk helped.");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_input_rejected_before_pipeline() {
    assert_eq!(Message::user(""), Err(ValidationError::Empty));
    assert_eq!(Message::user("   \n\t "), Err(ValidationError::Empty));
    assert!(matches!(
        Message::user(&"x".repeat(5001)),
        Err(ValidationError::TooLong { len: 5001, max: 5000 })
    ));
}
