// Crisis keyword detector
//
// Tiered keyword scan over a message. High-risk categories are always
// scanned; the medium-risk list is only consulted when no high-risk
// category matched at all.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Maximum number of indicators surfaced in an assessment
pub const MAX_INDICATORS: usize = 5;

/// Tag used for indicators found by the medium-risk scan
pub const MEDIUM_RISK_TAG: &str = "medium_risk";

/// Categories whose presence alone makes a message high risk
const HIGH_TIER_CATEGORIES: &[&str] = &["suicide", "self_harm"];

const DEFAULT_HIGH_RISK: &[(&str, &[&str])] = &[
    (
        "suicide",
        &[
            "suicide",
            "suicidal",
            "kill myself",
            "end my life",
            "don't want to live",
        ],
    ),
    (
        "self_harm",
        &[
            "self harm",
            "cut myself",
            "hurt myself",
            "injure",
            "harm myself",
        ],
    ),
    (
        "extreme_despair",
        &[
            "can't take it anymore",
            "hopeless",
            "no point",
            "nothing matters",
        ],
    ),
    (
        "abuse",
        &["abusing me", "beat me", "hit me", "abuse", "violent"],
    ),
    (
        "acute_crisis",
        &["emergency", "urgent", "right now", "immediately"],
    ),
];

const DEFAULT_MEDIUM_RISK: &[&str] = &[
    "depressed",
    "suicidal thoughts",
    "panic",
    "overwhelmed",
    "can't cope",
    "breakdown",
    "crisis",
    "scared",
    "terrified",
    "dying",
    "death",
    "toxic",
    "trapped",
];

const DEFAULT_LOW_RISK: &[&str] = &[
    "sad",
    "anxious",
    "worried",
    "stressed",
    "frustrated",
    "tired",
    "lonely",
    "confused",
    "lost",
    "scared",
];

/// Coarse severity of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

/// A (category, matched phrase) pair recorded during scanning
///
/// Serialized as `"<category>: <keyword>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RiskIndicator {
    pub category: String,
    pub keyword: String,
}

impl RiskIndicator {
    pub fn new(category: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            keyword: keyword.into(),
        }
    }

    fn is_high_tier(&self) -> bool {
        HIGH_TIER_CATEGORIES.contains(&self.category.as_str())
    }

    fn is_medium_risk(&self) -> bool {
        self.category == MEDIUM_RISK_TAG
    }
}

impl fmt::Display for RiskIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.keyword)
    }
}

impl From<RiskIndicator> for String {
    fn from(indicator: RiskIndicator) -> Self {
        indicator.to_string()
    }
}

impl TryFrom<String> for RiskIndicator {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let (category, keyword) = value
            .split_once(": ")
            .ok_or_else(|| format!("Malformed risk indicator: {}", value))?;
        Ok(Self::new(category, keyword))
    }
}

/// Result of scanning a single message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub is_high_risk: bool,
    pub risk_level: RiskLevel,
    pub indicators: Vec<RiskIndicator>,
}

impl RiskAssessment {
    /// Assessment used when nothing can be said about a message
    pub fn safe_default() -> Self {
        Self {
            is_high_risk: false,
            risk_level: RiskLevel::Low,
            indicators: Vec::new(),
        }
    }
}

/// One high-risk category and its phrases, in scan order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub category: String,
    pub phrases: Vec<String>,
}

/// Keyword tables, loadable from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskKeywords {
    pub high_risk: Vec<KeywordCategory>,
    pub medium_risk: Vec<String>,
    #[serde(default)]
    pub low_risk: Vec<String>,
}

impl Default for RiskKeywords {
    fn default() -> Self {
        fn to_owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            high_risk: DEFAULT_HIGH_RISK
                .iter()
                .map(|(category, phrases)| KeywordCategory {
                    category: category.to_string(),
                    phrases: to_owned(phrases),
                })
                .collect(),
            medium_risk: to_owned(DEFAULT_MEDIUM_RISK),
            low_risk: to_owned(DEFAULT_LOW_RISK),
        }
    }
}

/// Word-boundary matcher for a single literal phrase
#[derive(Debug, Clone)]
struct PhraseMatcher {
    phrase: String,
    pattern: Option<Regex>,
}

impl PhraseMatcher {
    fn new(phrase: &str) -> Self {
        let phrase = phrase.to_lowercase();
        let pattern = match Regex::new(&format!(r"\b{}\b", regex::escape(&phrase))) {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::error!("Failed to compile matcher for '{}': {}", phrase, e);
                None
            }
        };
        Self { phrase, pattern }
    }

    /// `text` must already be lower-cased
    fn is_match(&self, text: &str) -> bool {
        match &self.pattern {
            Some(re) => re.is_match(text),
            // Plain substring search if the pattern could not be built
            None => text.contains(&self.phrase),
        }
    }
}

/// Stateless risk assessor
///
/// Safe to share across threads; every call is a pure function of its input.
#[derive(Debug, Clone)]
pub struct RiskAssessor {
    high_risk: Vec<(String, Vec<PhraseMatcher>)>,
    medium_risk: Vec<PhraseMatcher>,
    low_risk: Vec<PhraseMatcher>,
}

impl Default for RiskAssessor {
    fn default() -> Self {
        Self::new(RiskKeywords::default())
    }
}

impl RiskAssessor {
    pub fn new(keywords: RiskKeywords) -> Self {
        // A blank phrase would compile to `\b\b` and match any word
        fn compile(list: &[String]) -> Vec<PhraseMatcher> {
            list.iter()
                .filter(|p| {
                    let blank = p.trim().is_empty();
                    if blank {
                        tracing::warn!("Skipping blank risk keyword");
                    }
                    !blank
                })
                .map(|p| PhraseMatcher::new(p))
                .collect()
        }

        Self {
            high_risk: keywords
                .high_risk
                .iter()
                .map(|c| (c.category.clone(), compile(&c.phrases)))
                .collect(),
            medium_risk: compile(&keywords.medium_risk),
            low_risk: compile(&keywords.low_risk),
        }
    }

    /// Load keyword tables from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read risk keywords file: {}", path.display()))?;

        let keywords: RiskKeywords = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse risk keywords file: {}", path.display()))?;

        Ok(Self::new(keywords))
    }

    /// Assess the risk level of a message
    pub fn assess(&self, text: &str) -> RiskAssessment {
        let text_lower = text.to_lowercase();
        let mut indicators = Vec::new();

        for (category, matchers) in &self.high_risk {
            for matcher in matchers {
                if matcher.is_match(&text_lower) {
                    indicators.push(RiskIndicator::new(category.as_str(), matcher.phrase.as_str()));
                }
            }
        }

        // Medium scan only runs when no high-risk category matched, even a
        // category that does not raise the tier (abuse, acute_crisis)
        if indicators.is_empty() {
            for matcher in &self.medium_risk {
                if matcher.is_match(&text_lower) {
                    indicators.push(RiskIndicator::new(MEDIUM_RISK_TAG, matcher.phrase.as_str()));
                }
            }
        }

        let medium_count = indicators.iter().filter(|i| i.is_medium_risk()).count();
        let (risk_level, is_high_risk) = if indicators.iter().any(RiskIndicator::is_high_tier) {
            (RiskLevel::High, true)
        } else if medium_count >= 2 {
            (RiskLevel::Medium, false)
        } else {
            (RiskLevel::Low, false)
        };

        tracing::info!(
            risk_level = %risk_level,
            indicators = indicators.len(),
            "Risk assessment: {} | Indicators: {:?}",
            risk_level,
            indicators.iter().map(ToString::to_string).collect::<Vec<_>>()
        );

        indicators.truncate(MAX_INDICATORS);

        RiskAssessment {
            is_high_risk,
            risk_level,
            indicators,
        }
    }

    /// Everyday emotional words found in the message (informational only)
    pub fn low_risk_matches(&self, text: &str) -> Vec<String> {
        let text_lower = text.to_lowercase();
        self.low_risk
            .iter()
            .filter(|m| m.is_match(&text_lower))
            .map(|m| m.phrase.clone())
            .collect()
    }

    /// Whether the conversation can continue without the crisis branch
    pub fn is_safe_to_continue(&self, text: &str) -> bool {
        !self.assess(text).is_high_risk
    }
}
