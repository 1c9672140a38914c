// Response Generator - supportive replies with a deterministic fallback
//
// Tries the configured backend once. Anything short of usable text (error,
// timeout, empty output) falls through to the template table, so a reply is
// always produced.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;

use crate::conversation::ConversationContext;
use crate::providers::{GenerationBackend, GenerationRequest};
use crate::sentiment::SentimentLabel;

pub mod fallback;
pub mod prompt;

pub use fallback::{fallback_responses, pick_fallback};
pub use prompt::{build_system_prompt, build_user_prompt};

/// Maximum length of a generated reply, in characters
pub const MAX_REPLY_CHARS: usize = 300;

/// Markers after which a model's actual reply starts
const REPLY_MARKERS: &[&str] = &["[/INST]", "<</SYS>>", "Assistant:"];

/// Markers where a model starts writing the next user turn
const TURN_END_MARKERS: &[&str] = &["\nUser:", "[INST]"];

/// Why a template reply was used instead of generated text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    NoBackend,
    BackendError,
    EmptyOutput,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::NoBackend => "no_backend",
            FallbackReason::BackendError => "backend_error",
            FallbackReason::EmptyOutput => "empty_output",
        }
    }
}

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Generated,
    Fallback(FallbackReason),
}

/// A reply plus its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub text: String,
    pub source: ReplySource,
}

/// Response generator
pub struct ResponseGenerator {
    backend: Option<Box<dyn GenerationBackend>>,
    rng: Mutex<StdRng>,
    max_reply_chars: usize,
}

impl ResponseGenerator {
    /// Create a generator; `None` means fallback-only
    pub fn new(backend: Option<Box<dyn GenerationBackend>>) -> Self {
        Self {
            backend,
            rng: Mutex::new(StdRng::from_entropy()),
            max_reply_chars: MAX_REPLY_CHARS,
        }
    }

    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    /// Seed template selection (reproducible tests)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_max_reply_chars(mut self, max_reply_chars: usize) -> Self {
        self.max_reply_chars = max_reply_chars.max(1);
        self
    }

    /// Name of the active backend ("fallback" when there is none)
    pub fn backend_name(&self) -> &str {
        self.backend.as_ref().map(|b| b.name()).unwrap_or("fallback")
    }

    /// Generate a supportive reply; never fails and never returns empty text
    pub async fn generate(
        &self,
        user_message: &str,
        sentiment: SentimentLabel,
        context: &ConversationContext,
    ) -> String {
        self.generate_reply(user_message, sentiment, context).await.text
    }

    /// Like [`ResponseGenerator::generate`] but also reports the reply source
    pub async fn generate_reply(
        &self,
        user_message: &str,
        sentiment: SentimentLabel,
        context: &ConversationContext,
    ) -> GeneratedReply {
        let Some(backend) = &self.backend else {
            return self.fallback(sentiment, FallbackReason::NoBackend);
        };

        let request = GenerationRequest::new(
            build_system_prompt(sentiment),
            build_user_prompt(&context.render(user_message)),
        );

        match backend.generate(&request).await {
            Ok(raw) => match clean_generated(&raw, self.max_reply_chars) {
                Some(text) => GeneratedReply {
                    text,
                    source: ReplySource::Generated,
                },
                None => {
                    tracing::warn!("Backend {} returned no usable text", backend.name());
                    self.fallback(sentiment, FallbackReason::EmptyOutput)
                }
            },
            Err(e) => {
                tracing::error!("Generation with {} failed: {:#}", backend.name(), e);
                self.fallback(sentiment, FallbackReason::BackendError)
            }
        }
    }

    /// A template reply for the sentiment polarity
    pub fn fallback_response(&self, sentiment: SentimentLabel) -> &'static str {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        pick_fallback(sentiment, &mut *rng)
    }

    fn fallback(&self, sentiment: SentimentLabel, reason: FallbackReason) -> GeneratedReply {
        tracing::debug!("Using fallback response ({})", reason.as_str());
        GeneratedReply {
            text: self.fallback_response(sentiment).to_string(),
            source: ReplySource::Fallback(reason),
        }
    }
}

/// Strip echoed prompt/role markers and bound the length
///
/// Returns `None` when nothing usable is left.
pub fn clean_generated(raw: &str, max_chars: usize) -> Option<String> {
    let mut text = raw;

    for marker in REPLY_MARKERS {
        if let Some(idx) = text.rfind(marker) {
            text = &text[idx + marker.len()..];
        }
    }

    for marker in TURN_END_MARKERS {
        if let Some(idx) = text.find(marker) {
            text = &text[..idx];
        }
    }

    let text = text.trim();
    let bounded = match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end(),
        None => text,
    };

    if bounded.is_empty() {
        None
    } else {
        Some(bounded.to_string())
    }
}
