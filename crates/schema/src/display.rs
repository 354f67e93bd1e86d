//! Read-only presentation of field values
//!
//! `display_value` maps a descriptor and its current value to a
//! [`DisplayValue`] that the view layout renders without further knowledge
//! of field kinds.

use chrono::{DateTime, NaiveDateTime};
use jobtrack_core::{PENDING_UPLOAD_KEY, RecordId};
use jobtrack_core::value::{normalize_blank, value_to_text};
use serde_json::Value;

use crate::field::{FieldDescriptor, FieldKind, SelectOption, option_key};

/// Format used for datetimes in the detail view
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// ============================================================================
// DisplayValue
// ============================================================================

/// Presentation of one field value
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    /// Nothing to show
    Empty,
    /// Plain text
    Text(String),
    /// Clickable link
    Link { href: String, text: String },
    /// Yes / No
    Flag(bool),
    /// Labels of the selected options
    Labels(Vec<String>),
    /// Star rating
    Stars { filled: u8, max: u8 },
    /// Attached or pending file
    File {
        id: Option<RecordId>,
        filename: String,
        pending: bool,
    },
    /// Table rows, one string per column
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Secret value that is never shown
    Masked,
}

impl DisplayValue {
    /// Check if there is nothing to show
    pub fn is_empty(&self) -> bool {
        matches!(self, DisplayValue::Empty)
    }

    /// Flatten to a single line of text
    pub fn to_text(&self) -> String {
        match self {
            DisplayValue::Empty => "-".to_string(),
            DisplayValue::Text(text) => text.clone(),
            DisplayValue::Link { text, .. } => text.clone(),
            DisplayValue::Flag(true) => "Yes".to_string(),
            DisplayValue::Flag(false) => "No".to_string(),
            DisplayValue::Labels(labels) => labels.join(", "),
            DisplayValue::Stars { filled, max } => {
                let filled = (*filled).min(*max) as usize;
                let empty = *max as usize - filled;
                format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
            }
            DisplayValue::File {
                filename, pending, ..
            } => {
                if *pending {
                    format!("{} (pending upload)", filename)
                } else {
                    filename.clone()
                }
            }
            DisplayValue::Table { rows, .. } => format!("{} row(s)", rows.len()),
            DisplayValue::Masked => "••••••••".to_string(),
        }
    }
}

impl std::fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Map a field value to its read-only presentation
pub fn display_value(field: &FieldDescriptor, value: Option<&Value>) -> DisplayValue {
    let Some(value) = normalize_blank(value) else {
        return match field.kind {
            FieldKind::Checkbox => DisplayValue::Flag(false),
            _ => DisplayValue::Empty,
        };
    };

    match &field.kind {
        FieldKind::Text | FieldKind::TextArea { .. } => DisplayValue::Text(value_to_text(Some(value))),
        FieldKind::Email => link("mailto:", value),
        FieldKind::Url => link("", value),
        FieldKind::Tel => link("tel:", value),
        FieldKind::Checkbox => DisplayValue::Flag(truthy(value)),
        FieldKind::Select { options } => DisplayValue::Labels(vec![label_for(options, value)]),
        FieldKind::MultiSelect { options } => match value {
            Value::Array(items) if items.is_empty() => DisplayValue::Empty,
            Value::Array(items) => {
                DisplayValue::Labels(items.iter().map(|v| label_for(options, v)).collect())
            }
            other => DisplayValue::Labels(vec![label_for(options, other)]),
        },
        FieldKind::DateTime => format_datetime(value),
        FieldKind::Password => DisplayValue::Masked,
        FieldKind::File { .. } => format_file(value),
        FieldKind::Table { columns } => match value {
            Value::Array(items) if !items.is_empty() => DisplayValue::Table {
                headers: columns.iter().map(|c| c.label.clone()).collect(),
                rows: items
                    .iter()
                    .map(|row| {
                        columns
                            .iter()
                            .map(|c| value_to_text(row.get(&c.key)))
                            .collect()
                    })
                    .collect(),
            },
            _ => DisplayValue::Empty,
        },
        FieldKind::Rating { max } => match value.as_f64() {
            Some(n) if n > 0.0 => DisplayValue::Stars {
                filled: n.round().clamp(0.0, *max as f64) as u8,
                max: *max,
            },
            _ => DisplayValue::Empty,
        },
        FieldKind::Salary { .. } => format_salary(value),
    }
}

fn link(scheme: &str, value: &Value) -> DisplayValue {
    let text = value_to_text(Some(value));
    DisplayValue::Link {
        href: format!("{}{}", scheme, text),
        text,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

fn label_for(options: &[SelectOption], value: &Value) -> String {
    let key = option_key(value);
    options
        .iter()
        .find(|o| o.key() == key)
        .map(|o| o.label.clone())
        .unwrap_or(key)
}

fn format_datetime(value: &Value) -> DisplayValue {
    let Some(raw) = value.as_str() else {
        return DisplayValue::Text(value_to_text(Some(value)));
    };

    let formatted = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string());

    DisplayValue::Text(formatted)
}

fn format_file(value: &Value) -> DisplayValue {
    match value {
        Value::Object(map) => {
            if let Some(upload) = map.get(PENDING_UPLOAD_KEY) {
                return DisplayValue::File {
                    id: None,
                    filename: value_to_text(upload.get("filename")),
                    pending: true,
                };
            }
            let id = map.get("id").and_then(RecordId::from_value);
            let filename = match map.get("filename").and_then(Value::as_str) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => id
                    .as_ref()
                    .map(|id| format!("File #{}", id))
                    .unwrap_or_default(),
            };
            DisplayValue::File {
                id,
                filename,
                pending: false,
            }
        }
        other => match RecordId::from_value(other) {
            Some(id) => DisplayValue::File {
                filename: format!("File #{}", id),
                id: Some(id),
                pending: false,
            },
            None => DisplayValue::Empty,
        },
    }
}

/// Salary values look like `{"min", "max", "currency", "period"}`
fn format_salary(value: &Value) -> DisplayValue {
    let Value::Object(map) = value else {
        return DisplayValue::Text(value_to_text(Some(value)));
    };

    let min = map.get("min").and_then(Value::as_f64);
    let max = map.get("max").and_then(Value::as_f64);
    let range = match (min, max) {
        (Some(lo), Some(hi)) if lo == hi => group_thousands(lo),
        (Some(lo), Some(hi)) => format!("{} - {}", group_thousands(lo), group_thousands(hi)),
        (Some(lo), None) => format!("from {}", group_thousands(lo)),
        (None, Some(hi)) => format!("up to {}", group_thousands(hi)),
        (None, None) => return DisplayValue::Empty,
    };

    let mut text = match map.get("currency").and_then(Value::as_str) {
        Some(currency) if !currency.is_empty() => format!("{} {}", currency, range),
        _ => range,
    };
    if let Some(period) = map.get("period").and_then(Value::as_str)
        && !period.is_empty()
    {
        text.push_str(" / ");
        text.push_str(period);
    }

    DisplayValue::Text(text)
}

/// Format a whole amount with comma separators
fn group_thousands(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if whole < 0 {
        out.insert(0, '-');
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::TableColumn;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_blank_values_are_empty() {
        let field = FieldDescriptor::text("notes", "Notes");
        assert_eq!(display_value(&field, None), DisplayValue::Empty);
        assert_eq!(display_value(&field, Some(&json!(""))), DisplayValue::Empty);
        assert_eq!(display_value(&field, None).to_text(), "-");
    }

    #[test]
    fn test_links() {
        let field = FieldDescriptor::email("email", "Email");
        assert_eq!(
            display_value(&field, Some(&json!("jane@example.com"))),
            DisplayValue::Link {
                href: "mailto:jane@example.com".to_string(),
                text: "jane@example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_checkbox_defaults_to_no() {
        let field = FieldDescriptor::checkbox("remote", "Remote");
        assert_eq!(display_value(&field, None).to_text(), "No");
        assert_eq!(display_value(&field, Some(&json!(true))).to_text(), "Yes");
    }

    #[test]
    fn test_select_labels() {
        let options = vec![SelectOption::new(1, "Acme"), SelectOption::new(2, "Globex")];
        let select = FieldDescriptor::select("company", "Company", options.clone());
        assert_eq!(display_value(&select, Some(&json!(2))).to_text(), "Globex");

        let multi = FieldDescriptor::multiselect("companies", "Companies", options);
        assert_eq!(
            display_value(&multi, Some(&json!([1, 2, 3]))).to_text(),
            "Acme, Globex, 3"
        );
        assert!(display_value(&multi, Some(&json!([]))).is_empty());
    }

    #[test]
    fn test_rating_stars() {
        let field = FieldDescriptor::rating("rating", "Rating");
        assert_eq!(display_value(&field, Some(&json!(3))).to_text(), "★★★☆☆");
        assert_eq!(display_value(&field, Some(&json!(9))).to_text(), "★★★★★");
        assert!(display_value(&field, Some(&json!(0))).is_empty());
    }

    #[test]
    fn test_salary_range() {
        let field = FieldDescriptor::salary("salary", "Salary");
        let value = json!({"min": 50000, "max": 65000, "currency": "EUR", "period": "year"});
        assert_eq!(
            display_value(&field, Some(&value)).to_text(),
            "EUR 50,000 - 65,000 / year"
        );
        assert_eq!(
            display_value(&field, Some(&json!({"min": 1200}))).to_text(),
            "from 1,200"
        );
        assert!(display_value(&field, Some(&json!({}))).is_empty());
    }

    #[test]
    fn test_file_states() {
        let field = FieldDescriptor::file("cv", "CV", &["pdf"]);
        assert_eq!(
            display_value(&field, Some(&json!({"id": 4, "filename": "cv.pdf"}))),
            DisplayValue::File {
                id: Some(RecordId::Int(4)),
                filename: "cv.pdf".to_string(),
                pending: false,
            }
        );
        assert_eq!(
            display_value(&field, Some(&json!({ PENDING_UPLOAD_KEY: {"filename": "new.pdf"} })))
                .to_text(),
            "new.pdf (pending upload)"
        );
        assert_eq!(display_value(&field, Some(&json!(9))).to_text(), "File #9");
    }

    #[test]
    fn test_datetime_formatting() {
        let field = FieldDescriptor::datetime("applied_at", "Applied");
        assert_eq!(
            display_value(&field, Some(&json!("2024-03-05T14:30:00Z"))).to_text(),
            "2024-03-05 14:30"
        );
        assert_eq!(
            display_value(&field, Some(&json!("2024-03-05T09:15"))).to_text(),
            "2024-03-05 09:15"
        );
        assert_eq!(
            display_value(&field, Some(&json!("next week"))).to_text(),
            "next week"
        );
    }

    #[test]
    fn test_table_rows() {
        let field = FieldDescriptor::table(
            "rounds",
            "Rounds",
            vec![TableColumn::new("stage", "Stage"), TableColumn::new("date", "Date")],
        );
        let value = json!([{"stage": "Phone", "date": "2024-01-02"}, {"stage": "Onsite"}]);
        assert_eq!(
            display_value(&field, Some(&value)),
            DisplayValue::Table {
                headers: vec!["Stage".to_string(), "Date".to_string()],
                rows: vec![
                    vec!["Phone".to_string(), "2024-01-02".to_string()],
                    vec!["Onsite".to_string(), String::new()],
                ],
            }
        );
    }

    #[test]
    fn test_password_masked() {
        let field = FieldDescriptor::password("secret", "Secret");
        assert_eq!(display_value(&field, Some(&json!("hunter2"))), DisplayValue::Masked);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1234567.0), "1,234,567");
        assert_eq!(group_thousands(-4500.0), "-4,500");
    }
}
