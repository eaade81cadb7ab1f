//! Parsing of the model's free-text answer into expression entries.

use serde_json::Value;

use super::model::ExpressionResult;
use crate::error::{CalcError, CalcResult};

/// Fence markers generative models wrap structured output in.
const FENCE_MARKERS: [&str; 2] = ["```json", "```"];

/// Remove Markdown code fence markers and surrounding whitespace.
pub fn strip_fences(text: &str) -> String {
    FENCE_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, ""))
        .trim()
        .to_string()
}

/// Parse the model answer into an ordered list of entries.
///
/// All or nothing: one malformed element fails the whole answer.
pub fn parse_response(text: &str) -> CalcResult<Vec<ExpressionResult>> {
    let cleaned = strip_fences(text);

    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| CalcError::parse(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(CalcError::parse("response is not a JSON array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(CalcError::parse(format!("entry {} is not an object", index)));
            }
            // A missing `assign` defaults to false.
            serde_json::from_value::<ExpressionResult>(item)
                .map_err(|e| CalcError::parse(format!("entry {}: {}", index, e)))
        })
        .collect()
}
