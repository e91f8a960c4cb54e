//! Deterministic keyword-based fallback classification
//!
//! Assigns type, category, and confidence from nothing but the lower-cased
//! description and the sign of the amount. Used whenever no AI backend is
//! configured and as the per-batch recovery path when a backend call fails.
//! Pure and side-effect-free: the same transaction always yields the same
//! classification.

use crate::models::{Category, Classification, Transaction, TransactionType};

/// Income keywords that override any expense-looking keyword also present
/// (e.g. "expense reimbursement" is income)
const PRIORITY_INCOME_KEYWORDS: &[&str] = &[
    "reimbursement",
    "refund",
    "return",
    "cashback",
    "deposit",
    "credit",
    "dividend",
    "interest",
    "bonus",
    "gift",
    "salary",
    "wage",
    "income",
];

/// Secondary income indicators
const INCOME_PATTERN_KEYWORDS: &[&str] = &[
    "payroll",
    "paycheck",
    "freelance",
    "contract",
    "consulting",
    "business income",
    "revenue",
    "sales",
    "tip",
];

/// Expense indicators, checked only after both income tiers
const EXPENSE_PATTERN_KEYWORDS: &[&str] = &[
    "purchase",
    "payment",
    "withdrawal",
    "debit",
    "bill",
    "fee",
    "charge",
    "business dinner",
    "business lunch",
];

/// Activity keywords describing what the person did; matches score 0.85
const ACTIVITY_KEYWORDS: &[&str] = &[
    "lunch", "dinner", "breakfast", "coffee", "meal", "order", "delivery",
];

/// Business-type keywords naming the kind of establishment; matches score 0.9
const BUSINESS_TYPE_KEYWORDS: &[&str] = &[
    "restaurant", "cafe", "hotel", "gym", "hospital", "pharmacy",
];

/// Income category keyword table, in tie-break order
const INCOME_CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Salary, &["salary", "wage", "payroll", "paycheck"]),
    (Category::Freelance, &["freelance", "contract", "consulting"]),
    (
        Category::BusinessIncome,
        &["business income", "revenue", "sales"],
    ),
    (
        Category::InvestmentReturns,
        &["dividend", "interest", "capital gains"],
    ),
    (
        Category::Refunds,
        &["refund", "return", "cashback", "reimbursement"],
    ),
    (Category::Gifts, &["gift", "bonus", "tip"]),
];

/// Expense category keyword table, in tie-break order
const EXPENSE_CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::FoodDelivery,
        &[
            "delivery", "order", "takeout", "takeaway", "swiggy", "zomato", "uber eats",
            "delivered",
        ],
    ),
    (
        Category::Restaurants,
        &["lunch", "dinner", "meal", "restaurant", "dining", "dine", "brunch"],
    ),
    (
        Category::Cafes,
        &["coffee", "cafe", "tea", "breakfast", "espresso", "latte", "cappuccino"],
    ),
    (
        Category::Groceries,
        &["grocery", "supermarket", "vegetables", "fruits", "market", "bazaar", "food hall"],
    ),
    (
        Category::FastFood,
        &[
            "drive", "counter", "quick", "fast food", "sandwich", "burger", "pizza", "taco",
            "bell", "kfc", "mcdonalds",
        ],
    ),
    (
        Category::Transportation,
        &[
            "taxi", "uber", "ola", "bus", "metro", "train", "fuel", "petrol", "gas", "parking",
            "ride",
        ],
    ),
    (
        Category::Travel,
        &[
            "hotel", "flight", "travel", "booking", "accommodation", "resort", "airline",
            "airport",
        ],
    ),
    (
        Category::Shopping,
        &[
            "shopping", "store", "retail", "mall", "purchase", "buy", "clothes", "electronics",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "movie", "cinema", "netflix", "spotify", "gaming", "theater", "concert",
            "entertainment",
        ],
    ),
    (
        Category::Healthcare,
        &[
            "hospital", "doctor", "pharmacy", "medical", "health", "clinic", "medicine",
            "treatment",
        ],
    ),
    (
        Category::Utilities,
        &[
            "electric", "electricity", "water", "internet", "phone", "cable", "utility", "bill",
        ],
    ),
    (
        Category::Housing,
        &["rent", "mortgage", "housing", "apartment", "house payment"],
    ),
    (
        Category::ProfessionalServices,
        &[
            "subscription", "software", "service", "professional", "office", "adobe",
            "microsoft",
        ],
    ),
    (
        Category::Fitness,
        &[
            "gym", "fitness", "workout", "yoga", "health club", "personal training",
            "membership",
        ],
    ),
    (
        Category::PersonalCare,
        &["salon", "spa", "beauty", "haircut", "cosmetics", "personal care"],
    ),
    (
        Category::Education,
        &["course", "education", "learning", "book", "training", "class"],
    ),
    (
        Category::Banking,
        &["fee", "charge", "bank", "atm", "transfer", "withdrawal fee"],
    ),
    (Category::Insurance, &["insurance", "premium", "policy"]),
    (
        Category::Investments,
        &["investment", "mutual fund", "sip", "stock", "dividend"],
    ),
];

/// Classify a transaction from its description and amount sign alone
pub fn classify(tx: &Transaction) -> Classification {
    let description = tx.description.to_lowercase();
    let tx_type = determine_type(&description, tx.amount);

    let (category, confidence) = match tx_type {
        TransactionType::Income => best_category(&description, INCOME_CATEGORY_KEYWORDS)
            .unwrap_or((Category::OtherIncome, 0.3)),
        TransactionType::Expense => best_category(&description, EXPENSE_CATEGORY_KEYWORDS)
            .unwrap_or((Category::Other, 0.3)),
    };

    Classification {
        tx_type,
        category,
        confidence,
    }
}

/// Determine income/expense in strict priority order: priority income
/// keywords, other income patterns, expense patterns, then amount sign
fn determine_type(description: &str, amount: f64) -> TransactionType {
    let contains_any = |keywords: &[&str]| keywords.iter().any(|k| description.contains(k));

    if contains_any(PRIORITY_INCOME_KEYWORDS) || contains_any(INCOME_PATTERN_KEYWORDS) {
        TransactionType::Income
    } else if contains_any(EXPENSE_PATTERN_KEYWORDS) {
        TransactionType::Expense
    } else if amount > 0.0 {
        TransactionType::Income
    } else {
        TransactionType::Expense
    }
}

/// Scan every category's keyword list and keep the highest-scoring match
///
/// Scoring: base 0.7; 0.85 for activity keywords; 0.9 for business-type
/// keywords; +0.1 per additional keyword matching from the same category
/// (capped at 0.95); +0.1 when the keyword is the entire trimmed description
/// (capped at 0.95). Ties keep the first-encountered category in table order.
fn best_category(
    description: &str,
    table: &[(Category, &[&str])],
) -> Option<(Category, f64)> {
    let trimmed = description.trim();
    let mut best: Option<(Category, f64)> = None;

    for (category, keywords) in table {
        let matching = keywords
            .iter()
            .filter(|k| description.contains(*k))
            .count();

        for keyword in *keywords {
            if !description.contains(keyword) {
                continue;
            }

            let mut confidence: f64 = 0.7;
            if ACTIVITY_KEYWORDS.contains(keyword) {
                confidence = 0.85;
            }
            if BUSINESS_TYPE_KEYWORDS.contains(keyword) {
                confidence = 0.9;
            }
            if matching > 1 {
                confidence = (confidence + 0.1 * (matching - 1) as f64).min(0.95);
            }
            if *keyword == trimmed {
                confidence = (confidence + 0.1).min(0.95);
            }

            if best.map_or(true, |(_, b)| confidence > b) {
                best = Some((*category, confidence));
            }
        }
    }

    best
}
