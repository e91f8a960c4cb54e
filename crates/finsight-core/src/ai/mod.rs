//! Pluggable chat-completion AI backend abstraction
//!
//! This module provides a backend-agnostic interface for the two AI
//! operations Finsight performs: batch transaction categorization and
//! suggestion generation. Any server implementing the OpenAI chat
//! completions API works (OpenRouter, OpenAI, vLLM, llama-server, ...).
//!
//! # Architecture
//!
//! - `AiBackend` trait: defines the interface for AI operations
//! - `AiClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAiCompatibleBackend`, `MockBackend`
//!
//! A backend call that fails in any way (transport, HTTP status, unparsable
//! payload) surfaces as an `Err`; the orchestrator recovers per batch with
//! the keyword fallback classifier, so backend failures are never fatal.

mod mock;
mod openai_compatible;
pub mod parsing;
pub mod prompts;

pub use mock::{MockBackend, MOCK_CONFIDENCE};
pub use openai_compatible::OpenAiCompatibleBackend;

use async_trait::async_trait;

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::insights::Insights;
use crate::models::{BatchCategorization, BatchEntry};
use crate::suggest::Suggestion;

/// Trait defining the interface for all AI backends
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Categorize one batch of transactions, addressed by batch-local index
    async fn categorize_batch(&self, batch: &[BatchEntry]) -> Result<Vec<BatchCategorization>>;

    /// Generate improvement suggestions from aggregated insights
    async fn generate_suggestions(&self, insights: &Insights) -> Result<Vec<Suggestion>>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for logging and status reporting)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AiClient {
    /// OpenAI-compatible chat completions backend
    OpenAiCompatible(OpenAiCompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AiClient {
    /// Build a client from an analyzer configuration
    ///
    /// Returns None when no API key is configured; callers degrade to the
    /// keyword fallback classifier.
    pub fn from_config(config: &AnalyzerConfig) -> Option<Self> {
        let api_key = config.api_key.as_deref()?;
        Some(Self::OpenAiCompatible(OpenAiCompatibleBackend::new(
            &config.base_url,
            &config.model,
            api_key,
        )))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        Self::Mock(MockBackend::new())
    }
}

#[async_trait]
impl AiBackend for AiClient {
    async fn categorize_batch(&self, batch: &[BatchEntry]) -> Result<Vec<BatchCategorization>> {
        match self {
            Self::OpenAiCompatible(b) => b.categorize_batch(batch).await,
            Self::Mock(b) => b.categorize_batch(batch).await,
        }
    }

    async fn generate_suggestions(&self, insights: &Insights) -> Result<Vec<Suggestion>> {
        match self {
            Self::OpenAiCompatible(b) => b.generate_suggestions(insights).await,
            Self::Mock(b) => b.generate_suggestions(insights).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            Self::OpenAiCompatible(b) => b.health_check().await,
            Self::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            Self::OpenAiCompatible(b) => b.model(),
            Self::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            Self::OpenAiCompatible(b) => b.host(),
            Self::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_requires_api_key() {
        let config = AnalyzerConfig::new(None, None, None);
        assert!(AiClient::from_config(&config).is_none());

        let config = AnalyzerConfig::new(Some("sk-test".into()), None, None);
        assert!(AiClient::from_config(&config).is_some());
    }

    #[test]
    fn test_mock_client_identity() {
        let client = AiClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AiClient::mock();
        assert!(client.health_check().await);
    }
}
