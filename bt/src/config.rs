//! Bedtime configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::BedtimeError;
use crate::r#loop::LoopConfig;

/// Main bedtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Draft/judge/revise loop settings
    pub story: LoopConfig,

    /// Prompt template overrides
    pub prompts: PromptsConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<(), BedtimeError> {
        self.llm.api_key()?;
        self.story.check().map_err(BedtimeError::Config)?;
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .bedtime.yml
        let local_config = PathBuf::from(".bedtime.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/bedtime/bedtime.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("bedtime").join("bedtime.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply command-line overrides for the loop bounds
    pub fn with_overrides(mut self, threshold: Option<i64>, max_revisions: Option<u32>) -> Self {
        if let Some(threshold) = threshold {
            self.story.acceptance_threshold = threshold;
        }
        if let Some(max_revisions) = max_revisions {
            self.story.max_revisions = max_revisions;
        }
        self
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name ("openai" or "anthropic")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key; provider default when unset
    #[serde(rename = "api-key-env", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// API base URL; provider default when unset
    #[serde(rename = "base-url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Hard cap on tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: None,
            base_url: None,
            max_tokens: 4096,
            timeout_ms: 300_000,
        }
    }
}

/// Key variable and base URL used when the config names neither
fn provider_defaults(provider: &str) -> (&'static str, &'static str) {
    match provider {
        "anthropic" => ("ANTHROPIC_API_KEY", "https://api.anthropic.com"),
        _ => ("OPENAI_API_KEY", "https://api.openai.com"),
    }
}

impl LlmConfig {
    /// Environment variable the API key is read from
    pub fn api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| provider_defaults(&self.provider).0)
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| provider_defaults(&self.provider).1)
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, BedtimeError> {
        let var = self.api_key_env();
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(BedtimeError::Config(format!(
                "LLM API key not found. Set the {} environment variable.",
                var
            ))),
        }
    }
}

/// Prompt template configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    /// Directory searched first for `{name}.pmt` overrides
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.story.acceptance_threshold, 8);
        assert_eq!(config.story.max_revisions, 2);
        assert!(config.prompts.dir.is_none());
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.base_url(), "https://api.openai.com");
        assert_eq!(config.timeout_ms, 300_000);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
llm:
  provider: anthropic
  model: claude-sonnet-4
  api-key-env: MY_API_KEY
  base-url: https://api.anthropic.com
  max-tokens: 2048
  timeout-ms: 60000

story:
  acceptance-threshold: 9
  max-revisions: 4
  generation:
    max-tokens: 1500
    temperature: 0.9

prompts:
  dir: /tmp/my-prompts
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env(), "MY_API_KEY");
        assert_eq!(config.llm.base_url(), "https://api.anthropic.com");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.story.acceptance_threshold, 9);
        assert_eq!(config.story.max_revisions, 4);
        assert_eq!(config.story.generation.max_tokens, 1500);
        assert_eq!(config.story.judging.max_tokens, 800);
        assert_eq!(config.prompts.dir, Some(PathBuf::from("/tmp/my-prompts")));
    }

    #[test]
    fn test_anthropic_provider_defaults() {
        let yaml = r#"
llm:
  provider: anthropic
  model: claude-sonnet-4
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.api_key_env(), "ANTHROPIC_API_KEY");
        assert_eq!(config.llm.base_url(), "https://api.anthropic.com");
    }

    #[test]
    fn test_explicit_endpoint_overrides_provider_default() {
        let config = LlmConfig {
            provider: "anthropic".to_string(),
            base_url: Some("http://localhost:8080".to_string()),
            ..LlmConfig::default()
        };
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.api_key_env(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gpt-4o-mini
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.story.acceptance_threshold, 8);
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "story:\n  max-revisions: 5").unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.story.max_revisions, 5);
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = Config::default().with_overrides(Some(6), None);
        assert_eq!(config.story.acceptance_threshold, 6);
        assert_eq!(config.story.max_revisions, 2);

        let config = Config::default().with_overrides(None, Some(0));
        assert_eq!(config.story.max_revisions, 0);
    }

    #[test]
    #[serial]
    fn test_validate_requires_api_key() {
        let config = Config {
            llm: LlmConfig {
                api_key_env: Some("BEDTIME_TEST_MISSING_KEY".to_string()),
                ..LlmConfig::default()
            },
            ..Config::default()
        };
        unsafe { std::env::remove_var("BEDTIME_TEST_MISSING_KEY") };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, BedtimeError::Config(_)));
        assert!(err.to_string().contains("BEDTIME_TEST_MISSING_KEY"));
    }

    #[test]
    #[serial]
    fn test_validate_checks_story_settings() {
        let mut config = Config {
            llm: LlmConfig {
                api_key_env: Some("BEDTIME_TEST_PRESENT_KEY".to_string()),
                ..LlmConfig::default()
            },
            ..Config::default()
        };
        unsafe { std::env::set_var("BEDTIME_TEST_PRESENT_KEY", "sk-test") };
        assert!(config.validate().is_ok());

        config.story.acceptance_threshold = 42;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("acceptance-threshold"));

        unsafe { std::env::remove_var("BEDTIME_TEST_PRESENT_KEY") };
    }
}
