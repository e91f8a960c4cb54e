//! Insight aggregation over labeled transaction sets
//!
//! Two entry points: [`streaming_insights`] is the lightweight variant
//! recomputed after every batch during streaming categorization;
//! [`generate_insights`] is the full variant produced once over the complete
//! labeled set. Both are pure functions; nothing is persisted.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Transaction;

/// Transactions below this confidence are counted in streaming insights
const STREAMING_REVIEW_THRESHOLD: f64 = 0.6;

/// Transactions below this confidence are listed for review in full insights
const REVIEW_THRESHOLD: f64 = 0.5;

/// Ranking depth for the streaming variant
const STREAMING_TOP_N: usize = 5;

/// Ranking depth for the full variant
const TOP_N: usize = 10;

/// Overall totals shared by both insight variants
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub total_transactions: usize,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_cash_flow: f64,
    pub date_range: DateRange,
    pub categorization_confidence: f64,
}

/// Lexical min/max over the non-empty date strings
#[derive(Debug, Clone, Default, Serialize)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

/// Per-category amount sum and transaction count
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryTotals {
    pub amount: f64,
    pub count: usize,
}

/// One month's cash flow, keyed by `YYYY-MM`
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonthlyFlow {
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
}

/// Entry in the full top-N rankings
#[derive(Debug, Clone, Serialize)]
pub struct RankedTransaction {
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
}

/// Entry in the streaming top-N rankings (kept small for event payloads)
#[derive(Debug, Clone, Serialize)]
pub struct TopTransaction {
    pub description: String,
    pub amount: f64,
    pub category: String,
}

/// Derived per-category share and average
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub percentage: f64,
    pub average_amount: f64,
}

/// A transaction flagged for manual review
#[derive(Debug, Clone, Serialize)]
pub struct FlaggedTransaction {
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub confidence: f64,
}

/// Full insights over a labeled transaction set
#[derive(Debug, Clone, Default, Serialize)]
pub struct Insights {
    pub summary: Summary,
    pub income_breakdown: BTreeMap<String, CategoryTotals>,
    pub expense_breakdown: BTreeMap<String, CategoryTotals>,
    pub monthly_analysis: BTreeMap<String, MonthlyFlow>,
    pub top_expenses: Vec<RankedTransaction>,
    pub top_income: Vec<RankedTransaction>,
    pub category_insights: BTreeMap<String, CategoryStats>,
    pub low_confidence_transactions: Vec<FlaggedTransaction>,
}

/// Lightweight insights recomputed after each streaming batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct StreamingInsights {
    pub summary: Summary,
    pub income_breakdown: BTreeMap<String, f64>,
    pub expense_breakdown: BTreeMap<String, f64>,
    pub top_expenses: Vec<TopTransaction>,
    pub top_income: Vec<TopTransaction>,
    pub low_confidence_count: usize,
}

/// Extract the `YYYY-MM` bucket for a date string
///
/// Strict ISO parse first; otherwise the first seven characters, or
/// "Unknown" for anything shorter.
fn month_year(date: &str) -> String {
    if let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        return parsed.format("%Y-%m").to_string();
    }
    date.get(..7)
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown".to_string())
}

fn summarize(transactions: &[Transaction]) -> Summary {
    let total_income: f64 = transactions
        .iter()
        .filter(|tx| tx.is_income())
        .map(|tx| tx.amount.abs())
        .sum();
    let total_expenses: f64 = transactions
        .iter()
        .filter(|tx| !tx.is_income())
        .map(|tx| tx.amount.abs())
        .sum();

    let confidences: Vec<f64> = transactions.iter().filter_map(|tx| tx.confidence()).collect();
    let categorization_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    let dates: Vec<&str> = transactions
        .iter()
        .map(|tx| tx.date.as_str())
        .filter(|d| !d.is_empty())
        .collect();
    let date_range = DateRange {
        from: dates.iter().min().map(|d| d.to_string()).unwrap_or_default(),
        to: dates.iter().max().map(|d| d.to_string()).unwrap_or_default(),
    };

    Summary {
        total_transactions: transactions.len(),
        total_income,
        total_expenses,
        net_cash_flow: total_income - total_expenses,
        date_range,
        categorization_confidence,
    }
}

fn rank_descending<T, F: Fn(&T) -> f64>(entries: &mut Vec<T>, amount: F, keep: usize) {
    entries.sort_by(|a, b| {
        amount(b)
            .partial_cmp(&amount(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(keep);
}

/// Compute the lightweight insight variant used during streaming
pub fn streaming_insights(transactions: &[Transaction]) -> StreamingInsights {
    if transactions.is_empty() {
        return StreamingInsights::default();
    }

    let mut income_breakdown: BTreeMap<String, f64> = BTreeMap::new();
    let mut expense_breakdown: BTreeMap<String, f64> = BTreeMap::new();
    let mut top_expenses = Vec::new();
    let mut top_income = Vec::new();

    for tx in transactions {
        let entry = TopTransaction {
            description: tx.description.clone(),
            amount: tx.amount.abs(),
            category: tx.category_name().to_string(),
        };
        if tx.is_income() {
            *income_breakdown.entry(entry.category.clone()).or_default() += tx.amount.abs();
            top_income.push(entry);
        } else {
            *expense_breakdown.entry(entry.category.clone()).or_default() += tx.amount.abs();
            top_expenses.push(entry);
        }
    }

    rank_descending(&mut top_expenses, |t| t.amount, STREAMING_TOP_N);
    rank_descending(&mut top_income, |t| t.amount, STREAMING_TOP_N);

    let low_confidence_count = transactions
        .iter()
        .filter_map(|tx| tx.confidence())
        .filter(|c| *c < STREAMING_REVIEW_THRESHOLD)
        .count();

    StreamingInsights {
        summary: summarize(transactions),
        income_breakdown,
        expense_breakdown,
        top_expenses,
        top_income,
        low_confidence_count,
    }
}

/// Compute full insights over a labeled transaction set
pub fn generate_insights(transactions: &[Transaction]) -> Insights {
    if transactions.is_empty() {
        return Insights::default();
    }

    let mut insights = Insights {
        summary: summarize(transactions),
        ..Default::default()
    };

    for tx in transactions {
        let amount = tx.amount.abs();
        let category = tx.category_name().to_string();

        if let Some(confidence) = tx.confidence() {
            if confidence < REVIEW_THRESHOLD {
                insights.low_confidence_transactions.push(FlaggedTransaction {
                    date: tx.date.clone(),
                    description: tx.description.clone(),
                    amount: tx.amount,
                    category: category.clone(),
                    confidence,
                });
            }
        }

        let month = insights
            .monthly_analysis
            .entry(month_year(&tx.date))
            .or_default();

        let ranked = RankedTransaction {
            date: tx.date.clone(),
            description: tx.description.clone(),
            amount,
            category: category.clone(),
        };

        if tx.is_income() {
            month.income += amount;
            let totals = insights.income_breakdown.entry(category).or_default();
            totals.amount += amount;
            totals.count += 1;
            insights.top_income.push(ranked);
        } else {
            month.expenses += amount;
            let totals = insights.expense_breakdown.entry(category).or_default();
            totals.amount += amount;
            totals.count += 1;
            insights.top_expenses.push(ranked);
        }
        month.net = month.income - month.expenses;
    }

    rank_descending(&mut insights.top_expenses, |t| t.amount, TOP_N);
    rank_descending(&mut insights.top_income, |t| t.amount, TOP_N);

    let total_expenses = insights.summary.total_expenses;
    for (category, totals) in &insights.expense_breakdown {
        insights.category_insights.insert(
            category.clone(),
            CategoryStats {
                percentage: if total_expenses > 0.0 {
                    totals.amount / total_expenses * 100.0
                } else {
                    0.0
                },
                average_amount: if totals.count > 0 {
                    totals.amount / totals.count as f64
                } else {
                    0.0
                },
            },
        );
    }

    insights
}
