//! Command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use finsight_core::{
    generate_insights, parse::parse_records, Analyzer, AnalyzerConfig, RecordFormat, Transaction,
};
use finsight_server::AppState;

fn load_transactions(file: &Path) -> Result<Vec<Transaction>> {
    let name = file.to_string_lossy();
    let format = RecordFormat::from_path(&name)
        .context("unsupported file extension (expected .csv or .json)")?;
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let transactions = parse_records(&bytes, format)?;
    info!(count = transactions.len(), format = %format, "Loaded transactions");
    Ok(transactions)
}

/// Categorize a file and print insights (optionally with suggestions)
pub async fn cmd_analyze(file: &Path, no_llm: bool, suggestions: bool) -> Result<()> {
    let transactions = load_transactions(file)?;
    let analyzer = Analyzer::new(&AnalyzerConfig::from_env());

    let labeled = analyzer.categorize(transactions, !no_llm).await;
    let insights = generate_insights(&labeled);

    if suggestions {
        let suggestions = analyzer.suggest(&insights).await;
        let output = serde_json::json!({
            "insights": insights,
            "suggestions": suggestions,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&insights)?);
    }
    Ok(())
}

/// Categorize a file and print the labeled transactions
pub async fn cmd_categorize(file: &Path, no_llm: bool) -> Result<()> {
    let transactions = load_transactions(file)?;
    let analyzer = Analyzer::new(&AnalyzerConfig::from_env());

    let labeled = analyzer.categorize(transactions, !no_llm).await;
    println!("{}", serde_json::to_string_pretty(&labeled)?);
    Ok(())
}

/// Run the REST API server until interrupted
pub async fn cmd_serve(host: &str, port: u16, origins: Vec<String>) -> Result<()> {
    let state = Arc::new(AppState::new(AnalyzerConfig::from_env(), origins));
    finsight_server::serve(host, port, state).await
}
