//! Analysis endpoints: full and streaming file analysis

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tracing::{debug, info, warn};

use finsight_core::{
    generate_insights, parse::parse_records, AnalyzerConfig, Insights, RecordFormat, Suggestion,
    Transaction,
};

use crate::{ActiveAnalyzer, AppState};

use super::ApiError;

/// Optional per-request backend override
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeParams {
    pub model_name: Option<String>,
    pub api_key: Option<String>,
}

/// Headline numbers attached to the analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeSummary {
    pub total_transactions: usize,
    pub total_income: f64,
    pub total_expenses: f64,
    pub categories: Vec<String>,
    pub high_confidence_count: usize,
    pub low_confidence_count: usize,
}

/// Response body for POST /api/analyze
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub transactions: Vec<Transaction>,
    pub insights: Insights,
    pub suggestions: Vec<Suggestion>,
    pub summary: AnalyzeSummary,
}

/// Pull the uploaded file (field `file`) out of the multipart body
async fn read_upload(multipart: &mut Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
            return Ok((filename, bytes.to_vec()));
        }
    }
    Err(ApiError::BadRequest("Missing file field".into()))
}

/// Validate the upload file type
fn upload_format(filename: &str) -> Result<RecordFormat, ApiError> {
    RecordFormat::from_path(filename)
        .ok_or_else(|| ApiError::BadRequest("Only CSV and JSON files are supported".into()))
}

/// Resolve the analyzer for this request: request-scoped when the caller
/// supplied an API key, otherwise the process default
fn request_analyzer(state: &AppState, params: &AnalyzeParams) -> Arc<ActiveAnalyzer> {
    match &params.api_key {
        Some(key) => {
            debug!("Building request-scoped analyzer from caller-provided key");
            Arc::new(ActiveAnalyzer::from_config(AnalyzerConfig::new(
                Some(key.clone()),
                None,
                params.model_name.clone(),
            )))
        }
        None => state.current(),
    }
}

fn build_summary(transactions: &[Transaction], insights: &Insights) -> AnalyzeSummary {
    let categories: BTreeSet<String> = transactions
        .iter()
        .map(|tx| tx.category_name().to_string())
        .collect();

    AnalyzeSummary {
        total_transactions: transactions.len(),
        total_income: insights.summary.total_income,
        total_expenses: insights.summary.total_expenses,
        categories: categories.into_iter().collect(),
        high_confidence_count: transactions
            .iter()
            .filter_map(Transaction::confidence)
            .filter(|c| *c > 0.8)
            .count(),
        low_confidence_count: transactions
            .iter()
            .filter_map(Transaction::confidence)
            .filter(|c| *c < 0.6)
            .count(),
    }
}

/// POST /api/analyze - categorize an uploaded file and return transactions,
/// insights, and suggestions in one response
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeParams>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let (filename, bytes) = read_upload(&mut multipart).await?;
    let format = upload_format(&filename)?;
    info!(filename = %filename, format = %format, "Analyzing uploaded file");

    let active = request_analyzer(&state, &params);
    let transactions = parse_records(&bytes, format)?;
    let transactions = active.analyzer.categorize(transactions, true).await;
    let insights = generate_insights(&transactions);
    let suggestions = active.analyzer.suggest(&insights).await;
    let summary = build_summary(&transactions, &insights);

    Ok(Json(AnalyzeResponse {
        transactions,
        insights,
        suggestions,
        summary,
    }))
}

/// Serialize a named SSE event, logging instead of failing on bad payloads
fn sse_event(name: &'static str, data: &impl Serialize) -> Option<Event> {
    match Event::default().event(name).json_data(data) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(event = name, error = %e, "Failed to serialize SSE event");
            None
        }
    }
}

/// POST /api/analyze/stream - analyze with per-batch progress via
/// server-sent events
///
/// Event sequence: `analysis_started`, one `batch_complete` per batch (each
/// carrying the newly labeled transactions plus insights over everything
/// processed so far), `suggestions_generated`, `analysis_complete`.
pub async fn analyze_stream(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeParams>,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let (filename, bytes) = read_upload(&mut multipart).await?;
    let format = upload_format(&filename)?;
    let transactions = parse_records(&bytes, format)?;
    info!(
        filename = %filename,
        count = transactions.len(),
        "Starting streaming analysis"
    );

    let active = request_analyzer(&state, &params);
    let (events, receiver) = tokio::sync::mpsc::channel::<Event>(8);

    tokio::spawn(async move {
        let started = serde_json::json!({
            "total_transactions": transactions.len(),
            "filename": filename,
        });
        if let Some(event) = sse_event("analysis_started", &started) {
            if events.send(event).await.is_err() {
                return;
            }
        }

        let mut labeled: Vec<Transaction> = Vec::with_capacity(transactions.len());
        let mut progress = active.analyzer.categorize_streaming(transactions);
        while let Some(batch) = progress.next().await {
            labeled.extend(batch.new_transactions.iter().cloned());
            if let Some(event) = sse_event("batch_complete", &batch) {
                if events.send(event).await.is_err() {
                    debug!("SSE client disconnected, abandoning stream");
                    return;
                }
            }
        }

        let insights = generate_insights(&labeled);
        let suggestions = active.analyzer.suggest(&insights).await;
        let payload = serde_json::json!({
            "suggestions": suggestions,
            "suggestions_count": suggestions.len(),
        });
        if let Some(event) = sse_event("suggestions_generated", &payload) {
            if events.send(event).await.is_err() {
                return;
            }
        }

        let done = serde_json::json!({ "message": "Analysis completed successfully" });
        if let Some(event) = sse_event("analysis_complete", &done) {
            let _ = events.send(event).await;
        }
    });

    let stream = ReceiverStream::new(receiver).map(Ok::<_, Infallible>);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
