//! Batch and streaming categorization orchestration
//!
//! Splits a transaction sequence into fixed-size batches, drives each batch
//! through the AI backend or the keyword fallback classifier, and reassembles
//! the results in input order. Failures are recovered at batch granularity:
//! one failed backend call never affects other batches and never fails the
//! request.

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::ai::{AiBackend, AiClient};
use crate::config::AnalyzerConfig;
use crate::fallback;
use crate::insights::{streaming_insights, Insights, StreamingInsights};
use crate::models::{BatchEntry, Transaction};
use crate::suggest::{fallback_suggestions, Suggestion};

/// Number of transactions sent to the backend per call
pub const BATCH_SIZE: usize = 20;

/// Drives categorization and suggestion generation for one request
///
/// Holds an optional AI client; without one, every path degrades to the
/// deterministic keyword fallback. Cheap to clone (the client is an Arc-like
/// handle), so streaming can move a copy into its worker task.
#[derive(Clone)]
pub struct Analyzer {
    client: Option<AiClient>,
}

/// Outcome of categorizing one batch
///
/// An explicit value rather than unwinding: backend failure is an expected,
/// frequent condition handled per batch.
enum BatchOutcome {
    /// Backend returned a usable result set
    Backend(Vec<Transaction>),
    /// Backend call failed; the whole batch was classified by keyword fallback
    Fallback {
        reason: String,
        transactions: Vec<Transaction>,
    },
}

/// One progress event emitted per completed streaming batch
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub batch_number: usize,
    pub total_batches: usize,
    pub progress_percentage: f64,
    pub new_transactions: Vec<Transaction>,
    pub total_processed: usize,
    pub insights: StreamingInsights,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Analyzer {
    /// Build an analyzer from a configuration
    ///
    /// Without an API key the backend client is absent and classification is
    /// fallback-only; that is a degraded mode, not an error.
    pub fn new(config: &AnalyzerConfig) -> Self {
        let client = AiClient::from_config(config);
        match &client {
            Some(c) => info!(host = c.host(), model = c.model(), "AI backend configured"),
            None => warn!("AI backend unavailable; categorization will use keyword fallback"),
        }
        Self { client }
    }

    /// Build an analyzer around an explicit client (or none)
    pub fn with_client(client: Option<AiClient>) -> Self {
        Self { client }
    }

    /// Whether an AI backend is configured
    pub fn backend_available(&self) -> bool {
        self.client.is_some()
    }

    /// Categorize all transactions, preserving input order and count
    ///
    /// With `use_backend` false (or no client configured) every transaction
    /// is classified by the keyword fallback. Otherwise transactions go to
    /// the backend in batches of [`BATCH_SIZE`]; a failed batch falls back
    /// without affecting the others.
    pub async fn categorize(
        &self,
        transactions: Vec<Transaction>,
        use_backend: bool,
    ) -> Vec<Transaction> {
        let client = match (&self.client, use_backend) {
            (Some(client), true) => client,
            _ => return fallback_batch(&transactions),
        };

        let mut categorized = Vec::with_capacity(transactions.len());
        for (index, chunk) in transactions.chunks(BATCH_SIZE).enumerate() {
            match self.categorize_chunk(client, chunk).await {
                BatchOutcome::Backend(labeled) => categorized.extend(labeled),
                BatchOutcome::Fallback {
                    reason,
                    transactions: labeled,
                } => {
                    warn!(batch = index + 1, error = %reason, "Batch categorization failed, using fallback");
                    categorized.extend(labeled);
                }
            }
        }
        categorized
    }

    /// Categorize with per-batch progress events
    ///
    /// Spawns a worker task that processes batches sequentially and emits one
    /// [`ProgressEvent`] per batch over a bounded channel; each event is fully
    /// materialized (insights included) before the next batch starts. Dropping
    /// the returned stream stops the worker at the next send. Empty input
    /// produces an empty stream.
    pub fn categorize_streaming(
        &self,
        transactions: Vec<Transaction>,
    ) -> ReceiverStream<ProgressEvent> {
        let (events, receiver) = mpsc::channel(1);
        let analyzer = self.clone();

        tokio::spawn(async move {
            let total = transactions.len();
            if total == 0 {
                return;
            }
            let total_batches = total.div_ceil(BATCH_SIZE);
            let mut processed: Vec<Transaction> = Vec::with_capacity(total);

            for (index, chunk) in transactions.chunks(BATCH_SIZE).enumerate() {
                let batch_number = index + 1;
                debug!(
                    batch = batch_number,
                    total_batches,
                    size = chunk.len(),
                    "Processing batch"
                );

                let (labeled, error) = match &analyzer.client {
                    Some(client) => match analyzer.categorize_chunk(client, chunk).await {
                        BatchOutcome::Backend(labeled) => (labeled, None),
                        BatchOutcome::Fallback {
                            reason,
                            transactions: labeled,
                        } => {
                            warn!(batch = batch_number, error = %reason, "Batch categorization failed, using fallback");
                            (
                                labeled,
                                Some(format!(
                                    "Batch {} failed, used fallback categorization",
                                    batch_number
                                )),
                            )
                        }
                    },
                    None => (fallback_batch(chunk), None),
                };

                processed.extend(labeled.iter().cloned());
                let event = ProgressEvent {
                    batch_number,
                    total_batches,
                    progress_percentage: (processed.len() as f64 / total as f64 * 100.0)
                        .min(100.0),
                    new_transactions: labeled,
                    total_processed: processed.len(),
                    insights: streaming_insights(&processed),
                    error,
                };

                if events.send(event).await.is_err() {
                    debug!("Progress consumer dropped, stopping categorization stream");
                    return;
                }
            }
        });

        ReceiverStream::new(receiver)
    }

    /// Generate suggestions, falling back to the deterministic set when the
    /// backend is unavailable or returns garbage
    pub async fn suggest(&self, insights: &Insights) -> Vec<Suggestion> {
        if let Some(client) = &self.client {
            match client.generate_suggestions(insights).await {
                Ok(suggestions) => {
                    info!(count = suggestions.len(), "Generated AI suggestions");
                    return suggestions;
                }
                Err(e) => {
                    warn!(error = %e, "Suggestion generation failed, using fallback set");
                }
            }
        }
        fallback_suggestions(insights)
    }

    /// Run one batch through the backend, recovering to fallback on failure
    async fn categorize_chunk(&self, client: &AiClient, chunk: &[Transaction]) -> BatchOutcome {
        let entries = BatchEntry::from_transactions(chunk);
        match client.categorize_batch(&entries).await {
            Ok(results) => BatchOutcome::Backend(apply_results(chunk, results)),
            Err(e) => BatchOutcome::Fallback {
                reason: e.to_string(),
                transactions: fallback_batch(chunk),
            },
        }
    }
}

/// Match backend results to transactions by batch-local index
///
/// A transaction with no matching result, or whose result fails vocabulary
/// validation, is classified by keyword fallback individually.
fn apply_results(
    chunk: &[Transaction],
    results: Vec<crate::models::BatchCategorization>,
) -> Vec<Transaction> {
    chunk
        .iter()
        .enumerate()
        .map(|(i, tx)| {
            let classification = results
                .iter()
                .find(|r| r.id == i)
                .cloned()
                .and_then(|r| r.into_classification());
            match classification {
                Some(c) => tx.with_classification(c),
                None => tx.with_classification(fallback::classify(tx)),
            }
        })
        .collect()
}

/// Classify every transaction with the keyword fallback
fn fallback_batch(transactions: &[Transaction]) -> Vec<Transaction> {
    transactions
        .iter()
        .map(|tx| tx.with_classification(fallback::classify(tx)))
        .collect()
}
