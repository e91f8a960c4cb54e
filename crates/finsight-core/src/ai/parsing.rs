//! JSON parsing helpers for AI backend responses
//!
//! Model responses often wrap the JSON payload in markdown fences or extra
//! prose; these helpers extract and validate the payload.

use tracing::debug;

use crate::error::{Error, Result};
use crate::models::BatchCategorization;
use crate::suggest::Suggestion;

/// Strip surrounding markdown code fences, if any
fn strip_code_fences(response: &str) -> &str {
    let mut text = response.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Extract the outermost JSON array from a response
fn extract_array(response: &str) -> Result<&str> {
    let text = strip_code_fences(response);
    let start = text.find('[');
    let end = text.rfind(']');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&text[s..=e]),
        _ => Err(Error::InvalidData(format!(
            "No JSON array found in AI response | Raw: {}",
            truncate(text)
        ))),
    }
}

fn truncate(text: &str) -> String {
    if text.len() > 200 {
        format!("{}...", &text[..200])
    } else {
        text.to_string()
    }
}

/// Parse a batch categorization response
///
/// The whole array must parse; any failure is a batch failure and the caller
/// falls back to keyword classification for the entire batch.
pub fn parse_batch_categorizations(response: &str) -> Result<Vec<BatchCategorization>> {
    let json_str = extract_array(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid categorization JSON from AI: {} | Raw: {}",
            e,
            truncate(json_str)
        ))
    })
}

/// Parse a suggestions response
///
/// Validation is per element: objects missing required fields or carrying an
/// out-of-vocabulary category/impact are discarded, the rest survive.
pub fn parse_suggestions(response: &str) -> Result<Vec<Suggestion>> {
    let json_str = extract_array(response)?;
    let raw: Vec<serde_json::Value> = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid suggestions JSON from AI: {} | Raw: {}",
            e,
            truncate(json_str)
        ))
    })?;

    let mut suggestions = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value::<Suggestion>(value) {
            Ok(suggestion) => suggestions.push(suggestion),
            Err(e) => debug!(error = %e, "Discarding invalid suggestion from AI"),
        }
    }
    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggest::{Impact, SuggestionCategory};

    #[test]
    fn test_parse_categorizations_plain_array() {
        let response = r#"[
            {"id": 0, "type": "expense", "category": "Restaurants & Dining", "confidence": 0.95},
            {"id": 1, "type": "income", "category": "Salary", "confidence": 0.9}
        ]"#;
        let results = parse_batch_categorizations(response).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].id, 1);
        assert_eq!(results[1].tx_type, "income");
    }

    #[test]
    fn test_parse_categorizations_with_prose_and_fences() {
        let response = "Here you go:\n```json\n[{\"id\": 0, \"type\": \"expense\", \
                        \"category\": \"Other\", \"confidence\": 0.5}]\n```";
        let results = parse_batch_categorizations(response).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].category, "Other");
    }

    #[test]
    fn test_parse_categorizations_rejects_non_json() {
        assert!(parse_batch_categorizations("I cannot categorize these.").is_err());
        assert!(parse_batch_categorizations("[{\"id\": }]").is_err());
    }

    #[test]
    fn test_parse_suggestions_discards_invalid_elements() {
        let response = r#"```json
        [
            {"id": "s1", "title": "Cut dining out", "description": "...", "category": "spending", "impact": "high"},
            {"id": "s2", "title": "Missing fields", "category": "spending"},
            {"id": "s3", "title": "Bad vocab", "description": "...", "category": "lifestyle", "impact": "high"},
            {"id": "s4", "title": "Save more", "description": "...", "category": "savings", "impact": "low", "estimatedSavings": 120.5}
        ]
        ```"#;
        let suggestions = parse_suggestions(response).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].category, SuggestionCategory::Spending);
        assert_eq!(suggestions[1].impact, Impact::Low);
        assert_eq!(suggestions[1].estimated_savings, Some(120.5));
    }

    #[test]
    fn test_parse_suggestions_requires_array() {
        assert!(parse_suggestions("{}").is_err());
    }
}
