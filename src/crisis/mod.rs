// Crisis screening: keyword risk tiers and the scripted crisis response

pub mod detector;
pub mod resources;

pub use detector::{
    KeywordCategory, RiskAssessment, RiskAssessor, RiskIndicator, RiskKeywords, RiskLevel,
    MAX_INDICATORS,
};
pub use resources::{crisis_message, resources, resources_for_key};
