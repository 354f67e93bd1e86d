//! Value normalisation helpers
//!
//! Form widgets report "nothing entered" in several shapes (absent key,
//! `null`, empty string, empty array). These helpers fold them together so
//! required checks and dirty detection agree on what an empty value is.

use serde_json::Value;
use std::collections::BTreeSet;

use crate::types::FormData;

/// Key under which a not-yet-uploaded file is stored in form data
pub const PENDING_UPLOAD_KEY: &str = "$upload";

/// Check if a value counts as missing.
///
/// Missing means absent, `null`, the empty string or an empty array.
/// `0` and `false` are real values.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Collapse absent / `null` / `""` / `[]` into `None`
pub fn normalize_blank(value: Option<&Value>) -> Option<&Value> {
    if is_missing(value) { None } else { value }
}

/// Compare two values the way dirty detection needs.
///
/// Blank shapes are equivalent, arrays are compared in order and
/// objects key by key with the same rules.
pub fn values_equivalent(a: Option<&Value>, b: Option<&Value>) -> bool {
    match (normalize_blank(a), normalize_blank(b)) {
        (None, None) => true,
        (Some(Value::Array(x)), Some(Value::Array(y))) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y.iter())
                    .all(|(l, r)| values_equivalent(Some(l), Some(r)))
        }
        (Some(Value::Object(x)), Some(Value::Object(y))) => {
            let keys: BTreeSet<&String> = x.keys().chain(y.keys()).collect();
            keys.into_iter()
                .all(|k| values_equivalent(x.get(k), y.get(k)))
        }
        (Some(l), Some(r)) => l == r,
        _ => false,
    }
}

/// Field names whose values differ between two snapshots
pub fn changed_fields(before: &FormData, after: &FormData) -> Vec<String> {
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    keys.into_iter()
        .filter(|k| !values_equivalent(before.get(*k), after.get(*k)))
        .cloned()
        .collect()
}

/// Check if two snapshots differ in any field
pub fn forms_differ(before: &FormData, after: &FormData) -> bool {
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    keys.into_iter()
        .any(|k| !values_equivalent(before.get(k), after.get(k)))
}

/// Render a scalar value as plain text (empty for blanks)
pub fn value_to_text(value: Option<&Value>) -> String {
    match normalize_blank(value) {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
