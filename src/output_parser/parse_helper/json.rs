use serde_json::Value;

use super::{balance_parenthesis, remove_multiline, remove_trailing_commas};

/// Parses JSON, retrying with progressively more aggressive repairs for the
/// mistakes models commonly make.
pub fn parse_partial_json(s: &str) -> Option<Value> {
    if let Ok(val) = serde_json::from_str::<Value>(s) {
        return Some(val);
    }

    let multiline_removed = remove_multiline(s);
    if let Ok(val) = serde_json::from_str::<Value>(&multiline_removed) {
        return Some(val);
    }

    let comma_cleaned = remove_trailing_commas(&multiline_removed);
    if let Ok(val) = serde_json::from_str::<Value>(&comma_cleaned) {
        return Some(val);
    }

    let balanced = balance_parenthesis(&comma_cleaned);
    serde_json::from_str(&balanced).ok()
}
