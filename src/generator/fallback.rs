// Template replies used when no generation backend answers

use rand::seq::SliceRandom;
use rand::Rng;

use crate::sentiment::SentimentLabel;

const NEGATIVE_RESPONSES: &[&str] = &[
    "I hear that you're going through a difficult time. It's okay to feel this way, and I'm here to listen. What's been the most challenging part for you?",
    "Thank you for sharing that with me. Those feelings are valid, and many people experience what you're going through. Have you tried any coping strategies that have helped before?",
    "I can sense you're struggling right now. That takes courage to express. Remember that difficult feelings are temporary, even when they feel overwhelming.",
    "It sounds like you're dealing with a lot. While I can't provide medical advice, I encourage you to consider talking with a counselor or therapist who can offer professional support.",
    "I appreciate you opening up about this. Sometimes just acknowledging what we're feeling is an important first step. What would help you feel a little better right now?",
];

const POSITIVE_RESPONSES: &[&str] = &[
    "That sounds wonderful! It's great to hear positive energy from you. What's been contributing to this good feeling?",
    "I'm glad to hear that! Celebrating these moments is important. How are you planning to maintain this positive momentum?",
    "That's fantastic! Keep nurturing what's bringing you joy. What's one thing you appreciate about yourself right now?",
    "Your positive outlook is inspiring! Keep channeling that energy into things that matter to you.",
    "That's excellent! It sounds like things are moving in a good direction for you. What's helping you feel this way?",
];

/// Templates for a sentiment polarity (NEGATIVE vs everything else)
pub fn fallback_responses(sentiment: SentimentLabel) -> &'static [&'static str] {
    if sentiment.is_negative() {
        NEGATIVE_RESPONSES
    } else {
        POSITIVE_RESPONSES
    }
}

/// Pick a template uniformly at random
pub fn pick_fallback<R: Rng + ?Sized>(sentiment: SentimentLabel, rng: &mut R) -> &'static str {
    let responses = fallback_responses(sentiment);
    responses.choose(rng).copied().unwrap_or_else(|| responses[0])
}
