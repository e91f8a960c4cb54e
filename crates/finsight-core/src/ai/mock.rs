//! Mock backend for testing
//!
//! Returns deterministic categorizations and can be scripted to fail
//! specific calls or omit specific batch indices, which is how the
//! orchestrator's per-batch and per-transaction fallback paths are tested.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::insights::Insights;
use crate::models::{BatchCategorization, BatchEntry};
use crate::suggest::{Impact, Suggestion, SuggestionCategory};

use super::AiBackend;

/// Confidence the mock assigns to every categorization; distinct from any
/// value the keyword fallback can produce, so tests can tell the paths apart
pub const MOCK_CONFIDENCE: f64 = 0.92;

/// Mock AI backend
#[derive(Clone, Default)]
pub struct MockBackend {
    healthy: bool,
    calls: Arc<AtomicUsize>,
    fail_on_calls: Arc<HashSet<usize>>,
    omit_ids: Arc<HashSet<usize>>,
}

impl MockBackend {
    /// Create a healthy mock backend
    pub fn new() -> Self {
        Self {
            healthy: true,
            ..Default::default()
        }
    }

    /// Create a mock that errors on the given 1-based categorize calls
    pub fn failing_on_calls(calls: &[usize]) -> Self {
        Self {
            healthy: true,
            fail_on_calls: Arc::new(calls.iter().copied().collect()),
            ..Default::default()
        }
    }

    /// Create a mock that omits results for the given batch-local indices
    pub fn omitting_ids(ids: &[usize]) -> Self {
        Self {
            healthy: true,
            omit_ids: Arc::new(ids.iter().copied().collect()),
            ..Default::default()
        }
    }

    /// Number of categorize calls made so far
    pub fn categorize_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiBackend for MockBackend {
    async fn categorize_batch(&self, batch: &[BatchEntry]) -> Result<Vec<BatchCategorization>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_calls.contains(&call) {
            return Err(Error::InvalidData(format!(
                "mock backend failure on call {}",
                call
            )));
        }

        Ok(batch
            .iter()
            .filter(|entry| !self.omit_ids.contains(&entry.id))
            .map(|entry| {
                let (tx_type, category) = if entry.amount > 0.0 {
                    ("income", "Salary")
                } else {
                    ("expense", "Shopping & Retail")
                };
                BatchCategorization {
                    id: entry.id,
                    tx_type: tx_type.to_string(),
                    category: category.to_string(),
                    confidence: Some(MOCK_CONFIDENCE),
                }
            })
            .collect())
    }

    async fn generate_suggestions(&self, _insights: &Insights) -> Result<Vec<Suggestion>> {
        Ok(vec![Suggestion {
            id: "mock-suggestion".into(),
            title: "Track your spending".into(),
            description: "Keep categorizing transactions to build a clearer picture.".into(),
            category: SuggestionCategory::Budget,
            impact: Impact::Low,
            estimated_savings: None,
        }])
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;

    #[tokio::test]
    async fn test_mock_labels_by_amount_sign() {
        let backend = MockBackend::new();
        let batch = BatchEntry::from_transactions(&[
            Transaction::new("2024-01-01", "Paycheck", 2500.0),
            Transaction::new("2024-01-02", "Shoes", -80.0),
        ]);

        let results = backend.categorize_batch(&batch).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tx_type, "income");
        assert_eq!(results[1].category, "Shopping & Retail");
        assert_eq!(backend.categorize_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_scripted_failure() {
        let backend = MockBackend::failing_on_calls(&[2]);
        let batch = BatchEntry::from_transactions(&[Transaction::new("d", "x", -1.0)]);

        assert!(backend.categorize_batch(&batch).await.is_ok());
        assert!(backend.categorize_batch(&batch).await.is_err());
        assert!(backend.categorize_batch(&batch).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_omits_requested_ids() {
        let backend = MockBackend::omitting_ids(&[0]);
        let batch = BatchEntry::from_transactions(&[
            Transaction::new("d", "a", -1.0),
            Transaction::new("d", "b", -2.0),
        ]);

        let results = backend.categorize_batch(&batch).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);
    }
}
