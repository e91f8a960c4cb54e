//! Improvement suggestions derived from insights
//!
//! Suggestions normally come from the AI backend; when it is unavailable or
//! returns garbage, a small deterministic set is derived directly from the
//! insights instead.

use serde::{Deserialize, Serialize};

use crate::insights::Insights;

/// Savings rate below which the fallback recommends saving more
const TARGET_SAVINGS_RATE: f64 = 20.0;

/// One actionable improvement suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: SuggestionCategory,
    pub impact: Impact,
    #[serde(
        rename = "estimatedSavings",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_savings: Option<f64>,
}

/// What part of the reader's finances a suggestion addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Savings,
    Spending,
    Budget,
    Investment,
}

impl SuggestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Spending => "spending",
            Self::Budget => "budget",
            Self::Investment => "investment",
        }
    }
}

/// Expected benefit level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Build the deterministic fallback suggestion set (at most three entries)
///
/// Derived from the low-confidence count, the top expense category, and the
/// savings rate.
pub fn fallback_suggestions(insights: &Insights) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    let low_confidence = insights.low_confidence_transactions.len();
    if low_confidence > 0 {
        suggestions.push(Suggestion {
            id: "review-transactions".into(),
            title: "Review Transaction Categories".into(),
            description: format!(
                "You have {} transactions with low confidence categorization. \
                 Review these to improve your expense tracking accuracy.",
                low_confidence
            ),
            category: SuggestionCategory::Budget,
            impact: Impact::Medium,
            estimated_savings: None,
        });
    }

    let top_category = insights
        .expense_breakdown
        .iter()
        .max_by(|a, b| {
            a.1.amount
                .partial_cmp(&b.1.amount)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .filter(|(_, totals)| totals.amount > 0.0);
    if let Some((name, totals)) = top_category {
        suggestions.push(Suggestion {
            id: "top-spending".into(),
            title: format!("Monitor {} Spending", name),
            description: format!(
                "{} is your highest expense category at {:.2}. \
                 Consider setting a monthly budget for this category.",
                name, totals.amount
            ),
            category: SuggestionCategory::Budget,
            impact: Impact::Medium,
            estimated_savings: Some((totals.amount * 0.1 * 100.0).round() / 100.0),
        });
    }

    let total_income = insights.summary.total_income;
    if total_income > 0.0 {
        let savings_rate =
            (total_income - insights.summary.total_expenses) / total_income * 100.0;
        if savings_rate < TARGET_SAVINGS_RATE {
            suggestions.push(Suggestion {
                id: "improve-savings".into(),
                title: "Increase Your Savings Rate".into(),
                description: format!(
                    "Your current savings rate is {:.1}%. Consider aiming for \
                     {:.0}% by reducing discretionary spending.",
                    savings_rate, TARGET_SAVINGS_RATE
                ),
                category: SuggestionCategory::Savings,
                impact: Impact::High,
                estimated_savings: None,
            });
        }
    }

    suggestions
}
