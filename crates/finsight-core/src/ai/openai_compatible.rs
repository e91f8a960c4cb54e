//! OpenAI-compatible chat completions backend
//!
//! Works with any server implementing the OpenAI `/chat/completions` API:
//! OpenRouter (the default), OpenAI, vLLM, LocalAI, llama-server, etc.
//! The configured base URL already carries the API prefix
//! (e.g. `https://openrouter.ai/api/v1`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::insights::Insights;
use crate::models::{BatchCategorization, BatchEntry};
use crate::suggest::Suggestion;

use super::parsing::{parse_batch_categorizations, parse_suggestions};
use super::prompts::{
    categorization_prompt, suggestion_prompt, CATEGORIZATION_SYSTEM, SUGGESTION_SYSTEM,
};
use super::AiBackend;

/// Token limit for categorization responses
const CATEGORIZATION_MAX_TOKENS: u32 = 2000;

/// Token limit for suggestion responses
const SUGGESTION_MAX_TOKENS: u32 = 1500;

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAiCompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiCompatibleBackend {
    /// Create a new backend against a chat-completions endpoint
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Make a chat completion request and return the message content
    async fn chat_completion(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature,
            max_tokens,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "Chat completion error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::InvalidData("Empty chat completion response".into()))
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// One chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl AiBackend for OpenAiCompatibleBackend {
    async fn categorize_batch(&self, batch: &[BatchEntry]) -> Result<Vec<BatchCategorization>> {
        debug!(
            model = %self.model,
            batch_size = batch.len(),
            "Requesting batch categorization"
        );

        let prompt = categorization_prompt(batch);
        let response = self
            .chat_completion(CATEGORIZATION_SYSTEM, &prompt, 0.1, CATEGORIZATION_MAX_TOKENS)
            .await?;
        debug!("Categorization response: {}", response);

        parse_batch_categorizations(&response)
    }

    async fn generate_suggestions(&self, insights: &Insights) -> Result<Vec<Suggestion>> {
        debug!(model = %self.model, "Requesting financial suggestions");

        let prompt = suggestion_prompt(insights);
        let response = self
            .chat_completion(SUGGESTION_SYSTEM, &prompt, 0.7, SUGGESTION_MAX_TOKENS)
            .await?;
        debug!("Suggestions response: {}", response);

        parse_suggestions(&response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend =
            OpenAiCompatibleBackend::new("https://openrouter.ai/api/v1/", "gpt-4o-mini", "sk-x");
        assert_eq!(backend.host(), "https://openrouter.ai/api/v1");
        assert_eq!(backend.model(), "gpt-4o-mini");
    }

    #[test]
    fn test_chat_completion_request_serialization() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "Be terse".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "Hello".to_string(),
                },
            ],
            temperature: 0.1,
            max_tokens: 2000,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Hello");
        assert_eq!(json["max_tokens"], 2000);
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.1).abs() < 0.001);
    }

    #[test]
    fn test_chat_completion_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "[]"},
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].message.content, "[]");
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAiCompatibleBackend::new("http://localhost:99999", "m", "k");
        assert!(!backend.health_check().await);
    }
}
