//! Configuration loading, validation, and management for Librarian.
//!
//! Loads configuration from `~/.librarian/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.librarian/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider settings (API key, endpoint, model)
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Size and budget limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Session persistence settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Generation provider configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (env `LIBRARIAN_API_KEY` takes priority)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".into()
}
fn default_model() -> String {
    "claude-haiku-4-5".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("limits", &self.limits)
            .field("session", &self.session)
            .finish()
    }
}

/// Size bounds and context budget limits.
///
/// The document-level chunking trigger (`chunk_size_threshold`) and the
/// chunker's own bound (`max_chunk_size`) are two independent knobs; neither
/// is derived from the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum tokens per specialist response
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Total context window budget per session, in tokens
    #[serde(default = "default_context_window_tokens")]
    pub context_window_tokens: usize,

    /// Documents above this many characters are chunked before processing
    #[serde(default = "default_chunk_size_threshold")]
    pub chunk_size_threshold: usize,

    /// Maximum characters per chunk
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

fn default_max_output_tokens() -> u32 {
    8000
}
fn default_context_window_tokens() -> usize {
    200_000
}
fn default_chunk_size_threshold() -> usize {
    50_000
}
fn default_max_chunk_size() -> usize {
    8000
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: default_max_output_tokens(),
            context_window_tokens: default_context_window_tokens(),
            chunk_size_threshold: default_chunk_size_threshold(),
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

/// Session snapshot persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Directory for session snapshot files
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

fn default_state_dir() -> PathBuf {
    AppConfig::config_dir()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.librarian/config.toml).
    ///
    /// Environment variable overrides (highest priority):
    /// - `LIBRARIAN_API_KEY` (falls back to `ANTHROPIC_API_KEY`)
    /// - `LIBRARIAN_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.provider.api_key.is_none() {
            config.provider.api_key = std::env::var("LIBRARIAN_API_KEY")
                .ok()
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("LIBRARIAN_MODEL") {
            config.provider.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".librarian")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "max_chunk_size must be positive".into(),
            ));
        }

        if self.limits.chunk_size_threshold == 0 {
            return Err(ConfigError::ValidationError(
                "chunk_size_threshold must be positive".into(),
            ));
        }

        if self.limits.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_output_tokens must be positive".into(),
            ));
        }

        if self.limits.max_output_tokens as usize >= self.limits.context_window_tokens {
            return Err(ConfigError::ValidationError(
                "max_output_tokens must be smaller than context_window_tokens".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.provider.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            limits: LimitsConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.model, "claude-haiku-4-5");
        assert_eq!(config.limits.max_chunk_size, 8000);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider.model, config.provider.model);
        assert_eq!(parsed.limits.max_chunk_size, config.limits.max_chunk_size);
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let mut config = AppConfig::default();
        config.limits.max_chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn ceiling_must_fit_in_window() {
        let mut config = AppConfig::default();
        config.limits.max_output_tokens = 300_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().limits.max_output_tokens, 8000);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[limits]
max_chunk_size = 4000
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.limits.max_chunk_size, 4000);
        assert_eq!(config.limits.max_output_tokens, 8000);
        assert_eq!(config.provider.base_url, "https://api.anthropic.com");
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn load_from_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[provider]\nmodel = \"claude-sonnet-4-5\"\n").unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.provider.model, "claude-sonnet-4-5");
    }
}
