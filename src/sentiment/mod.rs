// Sentiment scoring
//
// The classifier wraps a binary sentiment capability (POSITIVE / NEGATIVE).
// NEUTRAL only ever appears as the sentinel for "could not classify".

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod classifier;
pub mod onnx;

pub use classifier::SentimentClassifier;
pub use onnx::OnnxSentimentScorer;

/// Emotional polarity of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, SentimentLabel::Negative)
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label plus confidence in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f32,
}

impl SentimentResult {
    pub fn new(label: SentimentLabel, score: f32) -> Self {
        Self {
            label,
            score: score.clamp(0.0, 1.0),
        }
    }

    /// Sentinel substituted whenever classification fails
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.5,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.label == SentimentLabel::Neutral
    }
}

/// A binary sentiment capability
///
/// Implementations may fail; callers substitute [`SentimentResult::neutral`].
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    /// Score already-truncated text
    async fn score(&self, text: &str) -> Result<SentimentResult>;

    /// Model or scorer name (for health/config reporting)
    fn name(&self) -> &str;
}

/// Human-readable description of the detected emotion
pub fn emotion_insights(result: &SentimentResult) -> &'static str {
    match result.label {
        SentimentLabel::Negative if result.score > 0.9 => {
            "User expressing strong negative emotions (distress, sadness, frustration)"
        }
        SentimentLabel::Negative => "User expressing negative emotions",
        _ if result.score > 0.9 => "User expressing positive emotions (optimism, contentment)",
        _ => "User expressing mixed or neutral emotions",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_serde_uppercase() {
        let json = serde_json::to_string(&SentimentResult::new(SentimentLabel::Negative, 0.75)).unwrap();
        assert_eq!(json, r#"{"label":"NEGATIVE","score":0.75}"#);
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(SentimentResult::new(SentimentLabel::Positive, 1.7).score, 1.0);
        assert_eq!(SentimentResult::new(SentimentLabel::Positive, -0.2).score, 0.0);
    }

    #[test]
    fn test_emotion_insights() {
        let strong = SentimentResult::new(SentimentLabel::Negative, 0.98);
        assert!(emotion_insights(&strong).contains("strong negative"));

        let mild = SentimentResult::new(SentimentLabel::Negative, 0.6);
        assert_eq!(emotion_insights(&mild), "User expressing negative emotions");

        let upbeat = SentimentResult::new(SentimentLabel::Positive, 0.95);
        assert!(emotion_insights(&upbeat).contains("positive emotions"));

        assert!(emotion_insights(&SentimentResult::neutral()).contains("mixed or neutral"));
    }
}
