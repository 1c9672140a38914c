// Sentiment classifier with a lazily-loaded, process-wide model handle

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{SentimentResult, SentimentScorer};

/// Characters passed to the scorer (BERT-style models cap around 512 tokens)
pub const MAX_SCORED_CHARS: usize = 512;

type ScorerLoader = Arc<dyn Fn() -> Result<Arc<dyn SentimentScorer>> + Send + Sync>;

/// Sentiment classifier
///
/// The underlying scorer is loaded on first use, at most once. If loading
/// fails the failure is remembered and every later call returns the
/// NEUTRAL/0.5 sentinel without retrying.
pub struct SentimentClassifier {
    loader: Option<ScorerLoader>,
    scorer: OnceCell<Option<Arc<dyn SentimentScorer>>>,
}

impl SentimentClassifier {
    /// Create a classifier whose scorer is built by `loader` on first use
    ///
    /// The loader runs on the blocking pool, so it may download files or
    /// build an inference session.
    pub fn lazy<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn SentimentScorer>> + Send + Sync + 'static,
    {
        Self {
            loader: Some(Arc::new(loader)),
            scorer: OnceCell::new(),
        }
    }

    /// Create a classifier around an already-initialized scorer
    pub fn with_scorer(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self {
            loader: None,
            scorer: OnceCell::new_with(Some(Some(scorer))),
        }
    }

    /// Whether the scorer has been loaded successfully
    pub fn is_ready(&self) -> bool {
        matches!(self.scorer.get(), Some(Some(_)))
    }

    /// Force the scorer to load now (e.g. at server startup)
    pub async fn preload(&self) -> bool {
        self.handle().await.is_some()
    }

    async fn handle(&self) -> Option<&Arc<dyn SentimentScorer>> {
        self.scorer
            .get_or_init(|| async {
                match self.load().await {
                    Ok(scorer) => {
                        tracing::info!("Sentiment scorer '{}' loaded successfully", scorer.name());
                        Some(scorer)
                    }
                    Err(e) => {
                        tracing::error!("Failed to load sentiment scorer: {:#}", e);
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    async fn load(&self) -> Result<Arc<dyn SentimentScorer>> {
        let loader = self
            .loader
            .clone()
            .context("No sentiment scorer loader configured")?;

        tokio::task::spawn_blocking(move || loader())
            .await
            .context("Sentiment scorer loader panicked")?
    }

    /// Classify a message; never fails
    pub async fn classify(&self, text: &str) -> SentimentResult {
        let text = text.trim();
        if text.is_empty() {
            return SentimentResult::neutral();
        }

        let Some(scorer) = self.handle().await else {
            return SentimentResult::neutral();
        };

        let truncated = truncate_chars(text, MAX_SCORED_CHARS);
        match scorer.score(truncated).await {
            Ok(result) => {
                tracing::debug!("Sentiment analysis: {} ({:.3})", result.label, result.score);
                result
            }
            Err(e) => {
                tracing::error!("Error during sentiment analysis: {:#}", e);
                SentimentResult::neutral()
            }
        }
    }

    /// Name of the loaded scorer, if any
    pub fn scorer_name(&self) -> Option<&str> {
        match self.scorer.get() {
            Some(Some(scorer)) => Some(scorer.name()),
            _ => None,
        }
    }
}

/// Truncate to at most `max` characters on a char boundary
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::SentimentLabel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockScorer {
        fail: bool,
        seen: Mutex<Vec<String>>,
    }

    impl MockScorer {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SentimentScorer for MockScorer {
        async fn score(&self, text: &str) -> Result<SentimentResult> {
            self.seen.lock().unwrap().push(text.to_string());
            if self.fail {
                anyhow::bail!("model exploded");
            }
            Ok(SentimentResult::new(SentimentLabel::Positive, 0.99))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[tokio::test]
    async fn test_classify_passes_through_result() {
        let classifier = SentimentClassifier::with_scorer(Arc::new(MockScorer::new(false)));
        let result = classifier.classify("  I had a great day  ").await;

        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(classifier.is_ready());
        assert_eq!(classifier.scorer_name(), Some("mock"));
    }

    #[tokio::test]
    async fn test_scorer_failure_yields_sentinel() {
        let classifier = SentimentClassifier::with_scorer(Arc::new(MockScorer::new(true)));
        let result = classifier.classify("anything").await;

        assert_eq!(result, SentimentResult::neutral());
    }

    #[tokio::test]
    async fn test_empty_text_yields_sentinel_without_scoring() {
        let scorer = Arc::new(MockScorer::new(false));
        let classifier = SentimentClassifier::with_scorer(scorer.clone());

        assert!(classifier.classify("   ").await.is_sentinel());
        assert!(scorer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_input_truncated_to_limit() {
        let scorer = Arc::new(MockScorer::new(false));
        let classifier = SentimentClassifier::with_scorer(scorer.clone());
        let long = "é".repeat(MAX_SCORED_CHARS + 100);

        classifier.classify(&long).await;

        let seen = scorer.seen.lock().unwrap();
        assert_eq!(seen[0].chars().count(), MAX_SCORED_CHARS);
    }

    #[tokio::test]
    async fn test_loader_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let classifier = Arc::new(SentimentClassifier::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockScorer::new(false)) as Arc<dyn SentimentScorer>)
        }));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let classifier = classifier.clone();
            handles.push(tokio::spawn(async move { classifier.classify("hello").await }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().label, SentimentLabel::Positive);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let classifier = SentimentClassifier::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("no network")
        });

        assert!(!classifier.preload().await);
        assert!(classifier.classify("hello").await.is_sentinel());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!classifier.is_ready());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(truncate_chars("äöü", 2), "äö");
    }
}
