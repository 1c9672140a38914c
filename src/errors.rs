// Boundary error types
//
// Input errors are rejected before the pipeline runs. Capability failures
// never show up here: the sentiment classifier and the response generator
// absorb them locally.

use thiserror::Error;

/// Default ceiling for a single user message, in characters
pub const MAX_MESSAGE_CHARS: usize = 5000;

/// Reasons a message is rejected before any pipeline stage executes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    Empty,

    #[error("Message too long (max {max} characters, got {len})")]
    TooLong { len: usize, max: usize },
}

/// Errors raised while resolving configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid bind address '{0}'")]
    BindAddress(String),
}

/// Format a config parse error with helpful suggestions
pub fn config_parse_hint(error: &ConfigError) -> String {
    format!(
        "{}\n\n\
        \x1b[1;32mTry:\x1b[0m\n\
        1. Check config file syntax:\n\
           \x1b[36mcat ~/.solace/config.toml\x1b[0m\n\n\
        2. Move the file aside to run with defaults and environment variables:\n\
           \x1b[36mmv ~/.solace/config.toml ~/.solace/config.toml.backup\x1b[0m",
        error
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::Empty.to_string(), "Message cannot be empty");
        let err = ValidationError::TooLong { len: 6001, max: 5000 };
        assert!(err.to_string().contains("max 5000"));
    }

    #[test]
    fn test_config_hint_mentions_config_path() {
        let err = ConfigError::Parse {
            path: "/tmp/config.toml".to_string(),
            message: "expected `=`".to_string(),
        };
        let hint = config_parse_hint(&err);
        assert!(hint.contains("/tmp/config.toml"));
        assert!(hint.contains("~/.solace/config.toml"));
    }
}
