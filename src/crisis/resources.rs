// Crisis response and resource suggestions
//
// Static data only. Nothing here is generated or influenced by the content
// of the message that triggered it.

use super::detector::RiskLevel;

const CRISIS_MESSAGE: &str = "I'm concerned about what you're sharing. Your safety is important.

If you're in immediate danger or having thoughts of self-harm, please reach out to emergency services or a crisis helpline right away:

🆘 **Immediate Help Resources:**
• **National Suicide Prevention Lifeline (US):** 988 (call or text)
• **Crisis Text Line:** Text HOME to 741741
• **International Association for Suicide Prevention:** https://www.iasp.info/resources/Crisis_Centres/
• **Samaritans (UK):** 116 123
• **Lifeline (Australia):** 13 11 14
• **India Crisis Helpline:** 9152987821

Please reach out to someone you trust - a friend, family member, or mental health professional. You're not alone in this.

This chatbot is not a substitute for professional mental health care. Please speak with a licensed therapist or counselor.";

const LOW_RESOURCES: &[&str] = &[
    "Consider journaling about your feelings",
    "Try a breathing exercise when stressed",
    "Reach out to someone you trust",
    "Engage in activities that bring joy",
];

const MEDIUM_RESOURCES: &[&str] = &[
    "Consider speaking with a counselor or therapist",
    "Contact a crisis support hotline",
    "Visit a mental health clinic",
    "Reach out to a trusted friend or family member",
];

const HIGH_RESOURCES: &[&str] = &[
    "**Contact emergency services immediately**",
    "**Call the National Suicide Prevention Lifeline: 988**",
    "**Go to the nearest emergency room**",
    "**Tell someone you trust right now**",
];

/// The fixed crisis-support message sent on the crisis branch
pub fn crisis_message() -> &'static str {
    CRISIS_MESSAGE
}

/// Resource suggestions for a risk tier
pub fn resources(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::Low => LOW_RESOURCES,
        RiskLevel::Medium => MEDIUM_RESOURCES,
        RiskLevel::High => HIGH_RESOURCES,
    }
}

/// Resource suggestions for a textual tier key; unknown keys get the low table
pub fn resources_for_key(key: &str) -> &'static [&'static str] {
    resources(key.parse().unwrap_or(RiskLevel::Low))
}
