//! Prompt construction for the chat-completion backend

use crate::insights::Insights;
use crate::models::{BatchEntry, Category, EXPENSE_CATEGORIES, INCOME_CATEGORIES};

/// System instruction for batch categorization requests
pub const CATEGORIZATION_SYSTEM: &str =
    "You are a financial transaction categorizer. Always respond with valid JSON.";

/// System instruction for suggestion requests
pub const SUGGESTION_SYSTEM: &str = "You are a practical financial advisor. Analyze spending \
     data and provide actionable advice. Respond only with valid JSON.";

fn vocabulary(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the user prompt for one categorization batch
pub fn categorization_prompt(batch: &[BatchEntry]) -> String {
    let entries = serde_json::to_string_pretty(batch).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Analyze the following transactions and categorize each one using context-aware analysis.

For each transaction, determine:
1. Type: "income" (positive cash flow) or "expense" (negative cash flow)
2. Category: Choose the most appropriate category from the lists below
3. Confidence: A score from 0.0 to 1.0 indicating how confident you are

Expense Categories: {expense_categories}
Income Categories: {income_categories}

Transactions to categorize:
{entries}

CATEGORIZATION RULES:

1. ACTIVITY-BASED ANALYSIS (primary method):
   - Activity keywords: "lunch", "dinner", "breakfast", "coffee", "meal", "snack"
   - Business type indicators: "restaurant", "cafe", "hotel", "mall", "gym", "hospital"
   - Service indicators: "delivery", "order", "subscription", "bill", "fee", "membership"

2. FOOD & DINING SUBCATEGORIES:
   - "Food Delivery & Takeout": delivery, order, takeout, takeaway keywords
   - "Restaurants & Dining": lunch, dinner, meal, restaurant, dining keywords
   - "Cafes & Coffee Shops": coffee, cafe, tea, breakfast keywords
   - "Groceries & Supermarkets": grocery, supermarket, market, vegetables, fruits
   - "Fast Food & Quick Service": drive-thru, counter, quick service patterns

3. CONFIDENCE SCORING:
   - High (0.9+): clear activity plus business type match
   - Medium (0.7-0.8): activity keyword OR business type clear
   - Low (0.5-0.6): amount-based classification only

4. TYPE DETERMINATION PRIORITY:
   - Priority income keywords (override other words): reimbursement, refund, return, cashback, deposit, dividend, interest, bonus, salary, wage
   - Other income: freelance, contract, consulting, business income, revenue, sales
   - Expense patterns: purchase, payment, withdrawal, bill, fee, charge
   - IMPORTANT: priority keywords override conflicting words (e.g. "reimbursement" overrides "expense")
   - Use amount sign as the final fallback: positive = income, negative = expense

5. FOCUS ON INTENT, NOT BRAND:
   - Focus on what the person did (ate lunch, bought coffee, paid a bill)
   - Use context clues to understand the transaction purpose

Respond with a JSON array where each object has:
{{"id": transaction_id, "type": "income/expense", "category": "category_name", "confidence": confidence_score}}

Example response:
[
  {{"id": 0, "type": "expense", "category": "Restaurants & Dining", "confidence": 0.95}},
  {{"id": 1, "type": "income", "category": "Salary", "confidence": 0.90}}
]"#,
        expense_categories = vocabulary(EXPENSE_CATEGORIES),
        income_categories = vocabulary(INCOME_CATEGORIES),
        entries = entries,
    )
}

/// Build the user prompt for suggestion generation from aggregated insights
pub fn suggestion_prompt(insights: &Insights) -> String {
    let summary = &insights.summary;
    let savings_rate = if summary.total_income > 0.0 {
        summary.net_cash_flow / summary.total_income * 100.0
    } else {
        0.0
    };

    let expense_breakdown = serde_json::to_string_pretty(&insights.expense_breakdown)
        .unwrap_or_else(|_| "{}".to_string());
    let income_breakdown = serde_json::to_string_pretty(&insights.income_breakdown)
        .unwrap_or_else(|_| "{}".to_string());
    let top_expenses: Vec<_> = insights.top_expenses.iter().take(5).collect();
    let top_expenses =
        serde_json::to_string_pretty(&top_expenses).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Based on this financial data, provide personalized suggestions to improve financial health.

FINANCIAL OVERVIEW:
- Total Income: {total_income:.2}
- Total Expenses: {total_expenses:.2}
- Net Cash Flow: {net_cash_flow:.2}
- Savings Rate: {savings_rate:.1}%
- Total Transactions: {total_transactions}
- Low Confidence Categorizations: {low_confidence}

EXPENSE BREAKDOWN:
{expense_breakdown}

INCOME SOURCES:
{income_breakdown}

TOP EXPENSES:
{top_expenses}

Provide 3-5 actionable financial suggestions. Format as a JSON array with these fields:
- id: unique identifier
- title: clear, actionable title
- description: specific advice with reasoning
- category: type of suggestion (savings/spending/budget/investment)
- impact: expected benefit level (high/medium/low)
- estimatedSavings: optional monthly savings estimate as a number

Focus on practical improvements based on the actual spending patterns shown."#,
        total_income = summary.total_income,
        total_expenses = summary.total_expenses,
        net_cash_flow = summary.net_cash_flow,
        savings_rate = savings_rate,
        total_transactions = summary.total_transactions,
        low_confidence = insights.low_confidence_transactions.len(),
        expense_breakdown = expense_breakdown,
        income_breakdown = income_breakdown,
        top_expenses = top_expenses,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;

    #[test]
    fn test_categorization_prompt_carries_batch_and_vocabulary() {
        let batch = BatchEntry::from_transactions(&[
            Transaction::new("2024-01-01", "Subway Lunch", -8.99),
            Transaction::new("2024-01-02", "Paycheck", 2500.0),
        ]);
        let prompt = categorization_prompt(&batch);

        assert!(prompt.contains("Subway Lunch"));
        assert!(prompt.contains("\"id\": 1"));
        assert!(prompt.contains("Food Delivery & Takeout"));
        assert!(prompt.contains("Other Income"));
    }

    #[test]
    fn test_suggestion_prompt_reports_savings_rate() {
        let insights = Insights {
            summary: crate::insights::Summary {
                total_transactions: 2,
                total_income: 1000.0,
                total_expenses: 900.0,
                net_cash_flow: 100.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let prompt = suggestion_prompt(&insights);
        assert!(prompt.contains("Savings Rate: 10.0%"));
        assert!(prompt.contains("estimatedSavings"));
    }
}
