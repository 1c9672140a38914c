// Configuration loader
// Reads ~/.solace/config.toml (or an explicit path), then applies environment overrides

use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;
use crate::errors::ConfigError;

/// Default config location: ~/.solace/config.toml
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".solace/config.toml"))
}

/// Load configuration
///
/// An explicit `path` must exist. The default path is optional; without it
/// the built-in defaults are used. Environment variables win over the file.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path)?,
            _ => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        },
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(provider) = var("LLM_PROVIDER") {
        config.generation.provider = provider;
    }
    if let Some(key) = var("HF_API_KEY") {
        config.generation.hf_api_key = Some(key);
    }
    if let Some(model) = var("HF_MODEL_ID") {
        config.generation.hf_model_id = model;
    }
    if let Some(url) = var("OLLAMA_URL") {
        config.generation.ollama_url = url;
    }
    if let Some(model) = var("OLLAMA_MODEL") {
        config.generation.ollama_model = model;
    }
    if let Some(bind) = var("SOLACE_BIND") {
        config.server.bind_address = bind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_explicit_file() {
        let file = write_config(
            r#"
risk_keywords_path = "/etc/solace/keywords.json"

[server]
bind_address = "0.0.0.0:9000"

[generation]
provider = "ollama"
ollama_model = "llama3"
"#,
        );

        let mut config = read_config_file(file.path()).unwrap();
        apply_env_overrides(&mut config, |_| None);

        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.generation.provider, "ollama");
        assert_eq!(config.generation.ollama_model, "llama3");
        // Untouched sections keep their defaults
        assert_eq!(config.generation.ollama_url, "http://localhost:11434");
        assert_eq!(config.limits.max_message_chars, 5000);
        assert_eq!(
            config.risk_keywords_path,
            Some(PathBuf::from("/etc/solace/keywords.json"))
        );
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let file = write_config("[server\nbind_address = 1");
        let err = read_config_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            ("LLM_PROVIDER", "huggingface-api"),
            ("HF_API_KEY", "hf_secret"),
            ("HF_MODEL_ID", "mistralai/Mistral-7B-Instruct-v0.2"),
            ("SOLACE_BIND", "0.0.0.0:8080"),
            ("OLLAMA_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.generation.hf_api_key.as_deref(), Some("hf_secret"));
        assert_eq!(config.generation.hf_model_id, "mistralai/Mistral-7B-Instruct-v0.2");
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        // Empty values do not clobber defaults
        assert_eq!(config.generation.ollama_url, "http://localhost:11434");
    }
}
