//! Declarative field rules
//!
//! Common per-field checks that would otherwise be written as ad-hoc
//! validator closures. Rules only look at non-empty values; emptiness is
//! the job of the required check.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

static PHONE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()./-]{6,20}$").ok());

// ============================================================================
// Rule
// ============================================================================

/// Validation rules attachable to a field descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "params", rename_all = "snake_case")]
pub enum Rule {
    /// Minimum string length
    MinLength(usize),
    /// Maximum string length
    MaxLength(usize),
    /// Minimum numeric value
    Min(f64),
    /// Maximum numeric value
    Max(f64),
    /// Regex pattern validation
    Pattern { regex: String, message: String },
    /// Valid email address
    Email,
    /// Valid http(s) URL
    Url,
    /// Valid phone number
    Phone,
    /// Value must be in a list
    OneOf(Vec<String>),
}

impl Rule {
    /// Get a user-friendly error message
    pub fn error_message(&self) -> String {
        match self {
            Rule::MinLength(n) => format!("Minimum length is {} characters", n),
            Rule::MaxLength(n) => format!("Maximum length is {} characters", n),
            Rule::Min(n) => format!("Minimum value is {}", n),
            Rule::Max(n) => format!("Maximum value is {}", n),
            Rule::Pattern { message, .. } => message.clone(),
            Rule::Email => "Must be a valid email address".to_string(),
            Rule::Url => "Must be a valid URL".to_string(),
            Rule::Phone => "Must be a valid phone number".to_string(),
            Rule::OneOf(values) => format!("Must be one of: {}", values.join(", ")),
        }
    }

    /// Check a value against the rule.
    ///
    /// Returns the error message when the rule is violated.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        let passed = match self {
            Rule::MinLength(n) => text_of(value).is_none_or(|s| s.chars().count() >= *n),
            Rule::MaxLength(n) => text_of(value).is_none_or(|s| s.chars().count() <= *n),
            Rule::Min(n) => number_of(value).is_none_or(|v| v >= *n),
            Rule::Max(n) => number_of(value).is_none_or(|v| v <= *n),
            Rule::Pattern { regex, .. } => match (Regex::new(regex), text_of(value)) {
                (Ok(re), Some(s)) => re.is_match(&s),
                (Err(e), _) => {
                    tracing::warn!("Ignoring invalid pattern rule '{}': {}", regex, e);
                    true
                }
                (_, None) => true,
            },
            Rule::Email => matches_static(&EMAIL_RE, value),
            Rule::Phone => matches_static(&PHONE_RE, value),
            Rule::Url => text_of(value).is_none_or(|s| {
                let rest = s
                    .strip_prefix("https://")
                    .or_else(|| s.strip_prefix("http://"));
                rest.is_some_and(|r| !r.is_empty() && !r.contains(char::is_whitespace))
            }),
            Rule::OneOf(values) => text_of(value).is_none_or(|s| values.contains(&s)),
        };

        if passed {
            Ok(())
        } else {
            Err(self.error_message())
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Text view of a value; `None` for blanks so rules skip them
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric view of a value, accepting numeric strings from text inputs
fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn matches_static(re: &LazyLock<Option<Regex>>, value: &Value) -> bool {
    match (re.as_ref(), text_of(value)) {
        (Some(re), Some(s)) => re.is_match(&s),
        _ => true,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_length_rules() {
        assert!(Rule::MinLength(3).check(&json!("abc")).is_ok());
        assert_eq!(
            Rule::MinLength(3).check(&json!("ab")),
            Err("Minimum length is 3 characters".to_string())
        );
        assert!(Rule::MaxLength(2).check(&json!("abc")).is_err());
    }

    #[test]
    fn test_rules_skip_blank_values() {
        assert!(Rule::MinLength(3).check(&json!("")).is_ok());
        assert!(Rule::Email.check(&Value::Null).is_ok());
        assert!(Rule::Min(1.0).check(&Value::Null).is_ok());
    }

    #[test]
    fn test_numeric_rules_accept_strings() {
        assert!(Rule::Min(0.0).check(&json!("12")).is_ok());
        assert!(Rule::Max(5.0).check(&json!(6)).is_err());
        assert!(Rule::Max(5.0).check(&json!(0)).is_ok());
    }

    #[test]
    fn test_email_rule() {
        assert!(Rule::Email.check(&json!("jane@example.com")).is_ok());
        assert!(Rule::Email.check(&json!("jane@example")).is_err());
        assert!(Rule::Email.check(&json!("not an email")).is_err());
    }

    #[test]
    fn test_url_rule() {
        assert!(Rule::Url.check(&json!("https://acme.io/jobs")).is_ok());
        assert!(Rule::Url.check(&json!("acme.io")).is_err());
        assert!(Rule::Url.check(&json!("http://")).is_err());
    }

    #[test]
    fn test_phone_rule() {
        assert!(Rule::Phone.check(&json!("+49 30 1234567")).is_ok());
        assert!(Rule::Phone.check(&json!("call me")).is_err());
    }

    #[test]
    fn test_pattern_and_one_of() {
        let rule = Rule::Pattern {
            regex: r"^[A-Z]{2}$".to_string(),
            message: "Use a two-letter country code".to_string(),
        };
        assert!(rule.check(&json!("DE")).is_ok());
        assert_eq!(
            rule.check(&json!("Germany")),
            Err("Use a two-letter country code".to_string())
        );

        let rule = Rule::OneOf(vec!["remote".to_string(), "onsite".to_string()]);
        assert!(rule.check(&json!("remote")).is_ok());
        assert!(rule.check(&json!("hybrid")).is_err());
    }
}
