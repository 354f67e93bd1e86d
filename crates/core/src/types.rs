//! Core types used throughout Jobtrack
//!
//! Record identifiers, modal submodes, the form value map and the
//! per-field error map shared by the schema, client and engine crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Form Data
// ============================================================================

/// Attribute values of one entity, keyed like the field descriptors
pub type FormData = serde_json::Map<String, Value>;

// ============================================================================
// Record Identifiers
// ============================================================================

/// Identifier of a backend record.
///
/// The backend hands out numeric keys for most tables but some
/// deployments use string keys, so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Read an identifier out of a JSON value
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) if !s.is_empty() => Some(RecordId::Text(s.clone())),
            _ => None,
        }
    }

    /// Read the `id` attribute of an entity payload
    pub fn of(data: &FormData) -> Option<Self> {
        data.get("id").and_then(Self::from_value)
    }

    /// Convert back to a JSON value
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Int(n) => Value::from(*n),
            RecordId::Text(s) => Value::from(s.clone()),
        }
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Text(value)
    }
}

// ============================================================================
// Submode
// ============================================================================

/// Governs whether a modal opens read-only and whether success closes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Submode {
    /// Read-only detail view; the user may switch to editing
    #[default]
    View,
    /// Create a new record
    Add,
    /// Edit an existing record
    Edit,
}

impl Submode {
    /// Whether the modal starts in the editable form
    pub fn starts_editing(&self) -> bool {
        !matches!(self, Submode::View)
    }

    /// Whether a successful submission closes the modal
    pub fn closes_on_success(&self) -> bool {
        matches!(self, Submode::Add | Submode::Edit)
    }

    /// Get the display name for this submode
    pub fn display_name(&self) -> &'static str {
        match self {
            Submode::View => "View",
            Submode::Add => "Add",
            Submode::Edit => "Edit",
        }
    }
}

impl std::fmt::Display for Submode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Submode::View => write!(f, "view"),
            Submode::Add => write!(f, "add"),
            Submode::Edit => write!(f, "edit"),
        }
    }
}

// ============================================================================
// Field Errors
// ============================================================================

/// Mapping of field name to error message.
///
/// A field may collect several messages from different validation stages;
/// they are kept newline-joined in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Create an empty error map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message, replacing any existing one for the field
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Record a message, appending to any existing one for the field.
    ///
    /// An empty message still flags the field.
    pub fn append(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        self.0
            .entry(field.into())
            .and_modify(|existing| {
                if message.is_empty() {
                    return;
                }
                if !existing.is_empty() {
                    existing.push('\n');
                }
                existing.push_str(&message);
            })
            .or_insert(message);
    }

    /// Append every message of another map
    pub fn merge(&mut self, other: FieldErrors) {
        for (field, message) in other.0 {
            self.append(field, message);
        }
    }

    /// Get the message for a field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Drop the message for a field
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    /// Check if a field has a message
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Check if there are no errors
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with errors
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Remove every message
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate over (field, message) pairs in field-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Field names that carry errors
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<BTreeMap<String, String>> for FieldErrors {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut errors = FieldErrors::new();
        for (field, message) in iter {
            errors.append(field, message);
        }
        errors
    }
}

// ============================================================================
// Tests
// ============================================================================
