//! Domain models for Finsight

use serde::{Deserialize, Serialize};

/// One financial record: date, free-text description, signed amount, and an
/// optional classification assigned by a categorization stage.
///
/// The three classification fields (`type`, `category`, `confidence`) are
/// carried together: a transaction is either fully labeled or not labeled at
/// all. Classification stages never partially label a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(flatten)]
    pub classification: Option<Classification>,
}

impl Transaction {
    /// Create an unlabeled transaction
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount,
            classification: None,
        }
    }

    /// Return a labeled copy of this transaction
    pub fn with_classification(&self, classification: Classification) -> Self {
        Self {
            date: self.date.clone(),
            description: self.description.clone(),
            amount: self.amount,
            classification: Some(classification),
        }
    }

    /// Whether this transaction is labeled as income
    pub fn is_income(&self) -> bool {
        matches!(
            self.classification,
            Some(Classification {
                tx_type: TransactionType::Income,
                ..
            })
        )
    }

    /// Whether this transaction is labeled as an expense
    pub fn is_expense(&self) -> bool {
        matches!(
            self.classification,
            Some(Classification {
                tx_type: TransactionType::Expense,
                ..
            })
        )
    }

    /// Category display name, or "Uncategorized" when unlabeled
    pub fn category_name(&self) -> &'static str {
        self.classification
            .as_ref()
            .map(|c| c.category.as_str())
            .unwrap_or("Uncategorized")
    }

    /// Classification confidence, if labeled
    pub fn confidence(&self) -> Option<f64> {
        self.classification.as_ref().map(|c| c.confidence)
    }
}

/// Labels assigned by a categorization stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub category: Category,
    pub confidence: f64,
}

/// Cash-flow direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending/income category vocabulary
///
/// Categories are an enumerated tag serialized as the human-readable
/// vocabulary name, so the set the backend may choose from is closed and
/// exhaustiveness is compiler-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    // Expense categories
    #[serde(rename = "Food Delivery & Takeout")]
    FoodDelivery,
    #[serde(rename = "Restaurants & Dining")]
    Restaurants,
    #[serde(rename = "Cafes & Coffee Shops")]
    Cafes,
    #[serde(rename = "Groceries & Supermarkets")]
    Groceries,
    #[serde(rename = "Fast Food & Quick Service")]
    FastFood,
    #[serde(rename = "Transportation")]
    Transportation,
    #[serde(rename = "Travel & Accommodation")]
    Travel,
    #[serde(rename = "Shopping & Retail")]
    Shopping,
    #[serde(rename = "Entertainment & Recreation")]
    Entertainment,
    #[serde(rename = "Healthcare & Medical")]
    Healthcare,
    #[serde(rename = "Utilities & Bills")]
    Utilities,
    #[serde(rename = "Housing & Rent")]
    Housing,
    #[serde(rename = "Education & Learning")]
    Education,
    #[serde(rename = "Personal Care & Beauty")]
    PersonalCare,
    #[serde(rename = "Professional Services")]
    ProfessionalServices,
    #[serde(rename = "Fitness & Wellness")]
    Fitness,
    #[serde(rename = "Banking & Fees")]
    Banking,
    #[serde(rename = "Insurance")]
    Insurance,
    #[serde(rename = "Investments")]
    Investments,
    #[serde(rename = "Other")]
    Other,

    // Income categories
    #[serde(rename = "Salary")]
    Salary,
    #[serde(rename = "Freelance")]
    Freelance,
    #[serde(rename = "Business Income")]
    BusinessIncome,
    #[serde(rename = "Investment Returns")]
    InvestmentReturns,
    #[serde(rename = "Rental Income")]
    RentalIncome,
    #[serde(rename = "Refunds")]
    Refunds,
    #[serde(rename = "Gifts")]
    Gifts,
    #[serde(rename = "Other Income")]
    OtherIncome,
}

/// Expense category vocabulary, in presentation order
pub const EXPENSE_CATEGORIES: &[Category] = &[
    Category::FoodDelivery,
    Category::Restaurants,
    Category::Cafes,
    Category::Groceries,
    Category::FastFood,
    Category::Transportation,
    Category::Travel,
    Category::Shopping,
    Category::Entertainment,
    Category::Healthcare,
    Category::Utilities,
    Category::Housing,
    Category::Education,
    Category::PersonalCare,
    Category::ProfessionalServices,
    Category::Fitness,
    Category::Banking,
    Category::Insurance,
    Category::Investments,
    Category::Other,
];

/// Income category vocabulary, in presentation order
pub const INCOME_CATEGORIES: &[Category] = &[
    Category::Salary,
    Category::Freelance,
    Category::BusinessIncome,
    Category::InvestmentReturns,
    Category::RentalIncome,
    Category::Refunds,
    Category::Gifts,
    Category::OtherIncome,
];

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FoodDelivery => "Food Delivery & Takeout",
            Self::Restaurants => "Restaurants & Dining",
            Self::Cafes => "Cafes & Coffee Shops",
            Self::Groceries => "Groceries & Supermarkets",
            Self::FastFood => "Fast Food & Quick Service",
            Self::Transportation => "Transportation",
            Self::Travel => "Travel & Accommodation",
            Self::Shopping => "Shopping & Retail",
            Self::Entertainment => "Entertainment & Recreation",
            Self::Healthcare => "Healthcare & Medical",
            Self::Utilities => "Utilities & Bills",
            Self::Housing => "Housing & Rent",
            Self::Education => "Education & Learning",
            Self::PersonalCare => "Personal Care & Beauty",
            Self::ProfessionalServices => "Professional Services",
            Self::Fitness => "Fitness & Wellness",
            Self::Banking => "Banking & Fees",
            Self::Insurance => "Insurance",
            Self::Investments => "Investments",
            Self::Other => "Other",
            Self::Salary => "Salary",
            Self::Freelance => "Freelance",
            Self::BusinessIncome => "Business Income",
            Self::InvestmentReturns => "Investment Returns",
            Self::RentalIncome => "Rental Income",
            Self::Refunds => "Refunds",
            Self::Gifts => "Gifts",
            Self::OtherIncome => "Other Income",
        }
    }

    /// Whether this category belongs to the income vocabulary
    pub fn is_income(&self) -> bool {
        INCOME_CATEGORIES.contains(self)
    }

    /// Whether this category belongs to the expense vocabulary
    pub fn is_expense(&self) -> bool {
        EXPENSE_CATEGORIES.contains(self)
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        EXPENSE_CATEGORIES
            .iter()
            .chain(INCOME_CATEGORIES.iter())
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Supported record file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    Csv,
    Json,
}

impl RecordFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Detect the format from a file name extension
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = path.rsplit('.').next()?;
        ext.parse().ok()
    }
}

impl std::str::FromStr for RecordFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unsupported record format: {}", s)),
        }
    }
}

impl std::fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One transaction as presented to the categorization backend, addressed by
/// its position within the batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub id: usize,
    pub date: String,
    pub description: String,
    pub amount: f64,
}

impl BatchEntry {
    pub fn from_transactions(batch: &[Transaction]) -> Vec<Self> {
        batch
            .iter()
            .enumerate()
            .map(|(id, tx)| Self {
                id,
                date: tx.date.clone(),
                description: tx.description.clone(),
                amount: tx.amount,
            })
            .collect()
    }
}

/// One categorization result returned by the backend, addressed by
/// batch-local index
///
/// `category` stays a raw string at the wire; it is validated against the
/// `Category` vocabulary when matched back to its transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchCategorization {
    pub id: usize,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub category: String,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl BatchCategorization {
    /// Validate the raw wire result into a typed classification
    ///
    /// Returns None when the type or category is outside the vocabulary;
    /// the caller treats that transaction as unmatched.
    pub fn into_classification(self) -> Option<Classification> {
        let tx_type: TransactionType = self.tx_type.parse().ok()?;
        let category: Category = self.category.parse().ok()?;
        Some(Classification {
            tx_type,
            category,
            confidence: self.confidence.unwrap_or(0.5),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlabeled_transaction_serializes_without_classification() {
        let tx = Transaction::new("2024-01-15", "Coffee", -4.50);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["description"], "Coffee");
        assert!(json.get("category").is_none());
        assert!(json.get("type").is_none());
        assert!(json.get("confidence").is_none());
    }

    #[test]
    fn test_labeled_transaction_serializes_flat() {
        let tx = Transaction::new("2024-01-15", "Coffee", -4.50).with_classification(
            Classification {
                tx_type: TransactionType::Expense,
                category: Category::Cafes,
                confidence: 0.85,
            },
        );
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["category"], "Cafes & Coffee Shops");
        let confidence = json["confidence"].as_f64().unwrap();
        assert!((confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_category_round_trip() {
        for category in EXPENSE_CATEGORIES.iter().chain(INCOME_CATEGORIES.iter()) {
            let parsed: Category = category.as_str().parse().unwrap();
            assert_eq!(parsed, *category);
        }
    }

    #[test]
    fn test_category_from_str_case_insensitive() {
        let parsed: Category = "food delivery & takeout".parse().unwrap();
        assert_eq!(parsed, Category::FoodDelivery);
        assert!("Definitely Not A Category".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_vocabulary_split() {
        assert!(Category::Salary.is_income());
        assert!(!Category::Salary.is_expense());
        assert!(Category::Groceries.is_expense());
        assert!(!Category::Groceries.is_income());
    }

    #[test]
    fn test_record_format_from_path() {
        assert_eq!(
            RecordFormat::from_path("statement.csv"),
            Some(RecordFormat::Csv)
        );
        assert_eq!(
            RecordFormat::from_path("export.JSON"),
            Some(RecordFormat::Json)
        );
        assert_eq!(RecordFormat::from_path("notes.txt"), None);
    }

    #[test]
    fn test_batch_categorization_validation() {
        let raw = BatchCategorization {
            id: 0,
            tx_type: "expense".into(),
            category: "Groceries & Supermarkets".into(),
            confidence: None,
        };
        let classification = raw.into_classification().unwrap();
        assert_eq!(classification.tx_type, TransactionType::Expense);
        assert_eq!(classification.category, Category::Groceries);
        assert!((classification.confidence - 0.5).abs() < 1e-9);

        let bad = BatchCategorization {
            id: 1,
            tx_type: "expense".into(),
            category: "Miscellaneous Nonsense".into(),
            confidence: Some(0.9),
        };
        assert!(bad.into_classification().is_none());
    }
}
