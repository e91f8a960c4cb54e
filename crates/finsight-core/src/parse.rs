//! Record parsing for CSV and JSON transaction exports
//!
//! Produces ordered sequences of unlabeled [`Transaction`]s. CSV parsing is
//! lenient per row (a malformed amount becomes 0.0); JSON parsing aborts the
//! whole file on any structural problem.

use csv::ReaderBuilder;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{RecordFormat, Transaction};

/// Number of bytes sampled when auto-detecting the CSV delimiter
const SNIFF_WINDOW: usize = 1024;

/// Delimiters considered during auto-detection, in tie-break order
const DELIMITER_CANDIDATES: &[u8] = b",;\t|";

/// Parse raw file bytes into an ordered sequence of unlabeled transactions
pub fn parse_records(data: &[u8], format: RecordFormat) -> Result<Vec<Transaction>> {
    match format {
        RecordFormat::Csv => parse_csv(data),
        RecordFormat::Json => parse_json(data),
    }
}

/// Pick the delimiter with the highest occurrence count in the sample
///
/// Falls back to comma when nothing in the sample looks like a delimiter.
fn detect_delimiter(sample: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0usize;
    for &candidate in DELIMITER_CANDIDATES {
        let count = sample.bytes().filter(|&b| b == candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Parse an amount field, stripping thousands separators and currency symbols
///
/// An unparsable amount yields 0.0 rather than failing the row.
fn clean_amount(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '$').collect();
    cleaned.trim().parse().unwrap_or(0.0)
}

/// Parse CSV data with delimiter auto-detection and case-insensitive
/// `date`/`description`/`amount` header matching
fn parse_csv(data: &[u8]) -> Result<Vec<Transaction>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| Error::Parse(format!("CSV is not valid UTF-8: {}", e)))?;

    let sample = text.get(..SNIFF_WINDOW).unwrap_or(text);
    let delimiter = detect_delimiter(sample);

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let date_col = column("date");
    let description_col = column("description");
    let amount_col = column("amount");

    let mut transactions = Vec::new();
    for result in rdr.records() {
        // A structurally bad row is skipped; it never becomes a transaction
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Skipping malformed CSV row");
                continue;
            }
        };
        let field = |col: Option<usize>| {
            col.and_then(|i| record.get(i)).unwrap_or("").to_string()
        };

        let date = field(date_col);
        let description = field(description_col);
        let amount = amount_col
            .and_then(|i| record.get(i))
            .map(clean_amount)
            .unwrap_or(0.0);

        transactions.push(Transaction::new(date, description, amount));
    }

    debug!(
        count = transactions.len(),
        delimiter = %(delimiter as char),
        "Parsed CSV records"
    );
    Ok(transactions)
}

/// Parse JSON data: a top-level array of records or an object with a
/// `transactions` array; any other top-level shape aborts the file
fn parse_json(data: &[u8]) -> Result<Vec<Transaction>> {
    let value: Value = serde_json::from_slice(data)?;

    let records = match &value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("transactions")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                Error::Parse("JSON object is missing a transactions array".into())
            })?,
        _ => {
            return Err(Error::Parse(
                "JSON must be an array of transactions or an object with a transactions array"
                    .into(),
            ))
        }
    };

    let mut transactions = Vec::with_capacity(records.len());
    for (i, item) in records.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| Error::Parse(format!("transaction {} is not an object", i)))?;

        let date = obj
            .get("date")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let description = obj
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let amount = match obj.get("amount") {
            None | Some(Value::Null) => 0.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| {
                Error::Parse(format!("transaction {} has a non-numeric amount: {}", i, s))
            })?,
            Some(other) => {
                return Err(Error::Parse(format!(
                    "transaction {} has an invalid amount: {}",
                    i, other
                )))
            }
        };

        transactions.push(Transaction::new(date, description, amount));
    }

    debug!(count = transactions.len(), "Parsed JSON records");
    Ok(transactions)
}
