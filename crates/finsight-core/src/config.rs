//! Analyzer configuration
//!
//! Resolves the chat-completion backend credentials, base URL, and model
//! from explicit values and environment variables. A missing API key is not
//! an error: the analyzer degrades to fallback-only classification.

use tracing::{info, warn};

/// Default OpenRouter-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model when none is configured
pub const DEFAULT_MODEL: &str = "google/gemini-flash-1.5";

/// OpenAI endpoint used when only `OPENAI_API_KEY` is available
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used with the OpenAI endpoint fallback
pub const OPENAI_FALLBACK_MODEL: &str = "gpt-4o-mini";

/// Backend connection configuration for one analyzer instance
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// API key; None disables the backend entirely
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl AnalyzerConfig {
    /// Build a config from explicit values, filling base URL and model from
    /// the environment-derived defaults
    pub fn new(api_key: Option<String>, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(env_base_url),
            model: model.unwrap_or_else(env_model),
        }
    }

    /// Resolve configuration from the environment
    ///
    /// Precedence: `OPENROUTER_API_KEY` with the configured base URL, then
    /// `OPENAI_API_KEY` against the OpenAI endpoint, then no backend at all
    /// (classification falls back to keyword matching).
    pub fn from_env() -> Self {
        if let Ok(key) = std::env::var("OPENROUTER_API_KEY") {
            let config = Self::new(Some(key), None, None);
            info!(base_url = %config.base_url, model = %config.model, "Using OpenRouter API key");
            return config;
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            info!("No OpenRouter key found, falling back to OpenAI API");
            return Self {
                api_key: Some(key),
                base_url: OPENAI_BASE_URL.to_string(),
                model: OPENAI_FALLBACK_MODEL.to_string(),
            };
        }

        warn!("No API key configured; AI categorization disabled, using keyword fallback");
        Self::new(None, None, None)
    }

    /// Whether a backend can be constructed from this config
    pub fn backend_available(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

fn env_base_url() -> String {
    std::env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

fn env_model() -> String {
    std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_values_win() {
        let config = AnalyzerConfig::new(
            Some("sk-test".into()),
            Some("http://localhost:8080/v1".into()),
            Some("llama3.2".into()),
        );
        assert!(config.backend_available());
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "llama3.2");
    }

    #[test]
    fn test_no_key_disables_backend() {
        let config = AnalyzerConfig::new(None, None, None);
        assert!(!config.backend_available());
    }
}
