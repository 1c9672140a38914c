// Conversation messages and bounded context for generation

use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, MAX_MESSAGE_CHARS};

/// Number of prior messages kept when building generation context
pub const CONTEXT_HISTORY_LIMIT: usize = 10;

/// Who sent a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    /// Anything that is not "user" is treated as the assistant
    #[serde(other)]
    Assistant,
}

impl Role {
    fn display_name(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// A single conversation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    /// Validate and build an incoming user message
    ///
    /// Surrounding whitespace is trimmed before the checks.
    pub fn user(text: &str) -> Result<Self, ValidationError> {
        Self::user_with_limit(text, MAX_MESSAGE_CHARS)
    }

    /// Like [`Message::user`] with a custom length ceiling (in characters)
    pub fn user_with_limit(text: &str, max_chars: usize) -> Result<Self, ValidationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        let len = trimmed.chars().count();
        if len > max_chars {
            return Err(ValidationError::TooLong { len, max: max_chars });
        }

        Ok(Self {
            role: Role::User,
            content: trimmed.to_string(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        })
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            timestamp: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.content
    }
}

/// The most recent prior messages, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    messages: Vec<Message>,
}

impl ConversationContext {
    /// Keep the last [`CONTEXT_HISTORY_LIMIT`] messages of `history`
    pub fn from_history(history: &[Message]) -> Self {
        Self::with_limit(history, CONTEXT_HISTORY_LIMIT)
    }

    pub fn with_limit(history: &[Message], limit: usize) -> Self {
        let start = history.len().saturating_sub(limit);
        Self {
            messages: history[start..].to_vec(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Render the context followed by the current message
    pub fn render(&self, current_message: &str) -> String {
        let mut context = String::from("Recent conversation:\n");
        for msg in &self.messages {
            context.push_str(msg.role.display_name());
            context.push_str(": ");
            context.push_str(&msg.content);
            context.push('\n');
        }
        context.push_str("Current user message: ");
        context.push_str(current_message);
        context
    }
}
