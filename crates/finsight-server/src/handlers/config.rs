//! Configuration endpoints: model catalogue, status, and runtime updates

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use finsight_core::config::{AnalyzerConfig, DEFAULT_BASE_URL, OPENAI_BASE_URL};

use crate::{ActiveAnalyzer, AppState};

use super::ApiError;

/// A catalogue entry for GET /api/models
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub provider: &'static str,
    pub cost: &'static str,
}

/// Response for GET /api/models
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

/// GET /api/models - popular models with indicative pricing
pub async fn list_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: vec![
            ModelInfo {
                name: "openai/gpt-4o-mini",
                provider: "openrouter",
                cost: "$0.15/1M tokens",
            },
            ModelInfo {
                name: "anthropic/claude-3-haiku",
                provider: "openrouter",
                cost: "$0.25/1M tokens",
            },
            ModelInfo {
                name: "google/gemini-flash-1.5",
                provider: "openrouter",
                cost: "$0.075/1M tokens",
            },
            ModelInfo {
                name: "anthropic/claude-3-5-sonnet",
                provider: "openrouter",
                cost: "$3/1M tokens",
            },
            ModelInfo {
                name: "openai/gpt-4-turbo",
                provider: "openrouter",
                cost: "$10/1M tokens",
            },
        ],
    })
}

/// Response for GET /api/config/status
#[derive(Debug, Serialize)]
pub struct ConfigStatus {
    pub openrouter_configured: bool,
    pub openai_configured: bool,
    pub llm_available: bool,
    pub current_model: Option<String>,
    pub base_url: String,
}

/// GET /api/config/status - current backend configuration
pub async fn config_status(State(state): State<Arc<AppState>>) -> Json<ConfigStatus> {
    let active = state.current();
    let available = active.analyzer.backend_available();

    Json(ConfigStatus {
        openrouter_configured: std::env::var("OPENROUTER_API_KEY").is_ok(),
        openai_configured: std::env::var("OPENAI_API_KEY").is_ok(),
        llm_available: available,
        current_model: available.then(|| active.config.model.clone()),
        base_url: active.config.base_url.clone(),
    })
}

/// Request body for POST /api/configure
#[derive(Debug, Deserialize)]
pub struct ConfigureRequest {
    pub llm_provider: String,
    pub model_name: String,
    pub api_key: String,
}

/// Response for POST /api/configure
#[derive(Debug, Serialize)]
pub struct ConfigureResponse {
    pub message: String,
    pub provider: String,
    pub model: String,
    pub base_url: String,
}

/// POST /api/configure - replace the process-default analyzer wholesale
pub async fn configure(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigureRequest>,
) -> Result<Json<ConfigureResponse>, ApiError> {
    if request.api_key.trim().is_empty() {
        return Err(ApiError::BadRequest("API key is required".into()));
    }

    let base_url = match request.llm_provider.as_str() {
        "openrouter" => DEFAULT_BASE_URL,
        "openai" => OPENAI_BASE_URL,
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unknown LLM provider: {}",
                other
            )))
        }
    };

    let config = AnalyzerConfig::new(
        Some(request.api_key),
        Some(base_url.to_string()),
        Some(request.model_name.clone()),
    );
    state.replace(ActiveAnalyzer::from_config(config));
    info!(provider = %request.llm_provider, model = %request.model_name, "Backend reconfigured");

    Ok(Json(ConfigureResponse {
        message: "LLM configured successfully".into(),
        provider: request.llm_provider,
        model: request.model_name,
        base_url: base_url.to_string(),
    }))
}
