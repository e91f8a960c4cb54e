//! Finsight Core Library
//!
//! Shared functionality for the Finsight transaction analyzer:
//! - CSV/JSON record parsing with delimiter auto-detection
//! - Deterministic keyword-based fallback classification
//! - Batch and streaming categorization orchestration
//! - Pluggable chat-completion AI backends (OpenRouter, OpenAI, compatible)
//! - Insight aggregation (totals, monthly series, category breakdowns)
//! - Improvement suggestion generation with deterministic fallback

pub mod ai;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod fallback;
pub mod insights;
pub mod models;
pub mod parse;
pub mod suggest;

pub use ai::{AiBackend, AiClient, MockBackend, OpenAiCompatibleBackend};
pub use analyzer::{Analyzer, ProgressEvent, BATCH_SIZE};
pub use config::AnalyzerConfig;
pub use error::{Error, Result};
pub use insights::{generate_insights, streaming_insights, Insights, StreamingInsights};
pub use models::{
    BatchCategorization, BatchEntry, Category, Classification, RecordFormat, Transaction,
    TransactionType,
};
pub use suggest::{Impact, Suggestion, SuggestionCategory};
