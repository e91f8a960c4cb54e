//! Finsight Web Server
//!
//! Axum-based REST API over the finsight-core pipeline:
//! - Multipart file upload analysis (full and SSE-streaming variants)
//! - Backend configuration status and runtime reconfiguration
//! - Restrictive CORS policy with configurable origins
//! - Request tracing and input validation (file type, body size)
//!
//! The server holds no persistent state: every analysis request is processed
//! independently, and uploaded files are transient.

use std::sync::{Arc, RwLock};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use finsight_core::{Analyzer, AnalyzerConfig};

mod handlers;

#[cfg(test)]
mod tests;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// The live analyzer and the configuration it was built from
///
/// Replaced wholesale by the configure endpoint; handlers take an `Arc`
/// snapshot, so a racing reconfiguration is observed atomically as either
/// the old or the new value.
pub struct ActiveAnalyzer {
    pub config: AnalyzerConfig,
    pub analyzer: Analyzer,
}

impl ActiveAnalyzer {
    pub fn from_config(config: AnalyzerConfig) -> Self {
        let analyzer = Analyzer::new(&config);
        Self { config, analyzer }
    }
}

/// Shared application state
pub struct AppState {
    active: RwLock<Arc<ActiveAnalyzer>>,
    /// Allowed CORS origins; empty means permissive (local development)
    pub allowed_origins: Vec<String>,
}

impl AppState {
    pub fn new(config: AnalyzerConfig, allowed_origins: Vec<String>) -> Self {
        Self {
            active: RwLock::new(Arc::new(ActiveAnalyzer::from_config(config))),
            allowed_origins,
        }
    }

    /// Snapshot of the current default analyzer
    pub fn current(&self) -> Arc<ActiveAnalyzer> {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the default analyzer wholesale
    pub fn replace(&self, next: ActiveAnalyzer) {
        let mut guard = self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(next);
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = build_cors(&state.allowed_origins);

    Router::new()
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/analyze/stream", post(handlers::analyze_stream))
        .route("/api/models", get(handlers::list_models))
        .route("/api/config/status", get(handlers::config_status))
        .route("/api/configure", post(handlers::configure))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

/// Bind and serve the API until the process is stopped
pub async fn serve(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Finsight API listening");

    axum::serve(listener, router(state)).await?;
    Ok(())
}
