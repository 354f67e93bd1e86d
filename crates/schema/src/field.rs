//! Field descriptors
//!
//! This module contains the `FieldDescriptor` struct and related types
//! describing one editable/displayable attribute of an entity: its key,
//! label, kind (with kind-specific payload), required-ness, declarative
//! rules, custom validator and optional render slot.

use jobtrack_core::{EngineError, EngineResult, Validatable};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rules::Rule;
use crate::validation::FieldValidator;

// ============================================================================
// FieldDescriptor
// ============================================================================

/// Describes one attribute of an entity form or detail view
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Attribute key; unique within one form
    pub name: String,

    /// Display label
    pub label: String,

    /// Kind of field, carrying its kind-specific payload
    pub kind: FieldKind,

    /// Whether a value must be present before submitting
    pub required: bool,

    /// Placeholder text for input
    pub placeholder: Option<String>,

    /// Help text shown below input
    pub help_text: Option<String>,

    /// Whether the input is disabled (e.g. options still loading)
    pub disabled: bool,

    /// Declarative per-field rules
    pub rules: Vec<Rule>,

    /// Custom per-field validator
    pub validator: Option<FieldValidator>,

    /// Name of a caller-provided renderer replacing the default widget
    pub render_slot: Option<String>,

    /// Initial value for new records
    pub default_value: Option<Value>,
}

impl FieldDescriptor {
    /// Create a new field with the given name, label and kind
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
            help_text: None,
            disabled: false,
            rules: Vec::new(),
            validator: None,
            render_slot: None,
            default_value: None,
        }
    }

    /// Single-line text field
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    /// Multi-line text field
    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::TextArea { rows: 4 })
    }

    /// Email field (checked with the email rule)
    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Email).with_rule(Rule::Email)
    }

    /// URL field (checked with the URL rule)
    pub fn url(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Url).with_rule(Rule::Url)
    }

    /// Telephone field
    pub fn tel(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Tel).with_rule(Rule::Phone)
    }

    /// Checkbox field
    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Checkbox)
    }

    /// Dropdown select
    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(name, label, FieldKind::Select { options })
    }

    /// Multi-select
    pub fn multiselect(
        name: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(name, label, FieldKind::MultiSelect { options })
    }

    /// Date and time picker
    pub fn datetime(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::DateTime)
    }

    /// Masked password input
    pub fn password(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Password)
    }

    /// File attachment accepting the given extensions (e.g. `pdf`)
    pub fn file(name: impl Into<String>, label: impl Into<String>, accept: &[&str]) -> Self {
        Self::new(
            name,
            label,
            FieldKind::File {
                accept: accept.iter().map(|s| s.to_string()).collect(),
            },
        )
    }

    /// Editable table of rows
    pub fn table(
        name: impl Into<String>,
        label: impl Into<String>,
        columns: Vec<TableColumn>,
    ) -> Self {
        Self::new(name, label, FieldKind::Table { columns })
    }

    /// Star rating from 1 to 5
    pub fn rating(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Rating { max: 5 })
    }

    /// Salary range with currency and period
    pub fn salary(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Salary {
                currencies: vec!["EUR".to_string(), "USD".to_string(), "GBP".to_string()],
            },
        )
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as disabled
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Set the placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help_text = Some(help.into());
        self
    }

    /// Add a declarative rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Set the custom validator
    pub fn with_validator(mut self, validator: FieldValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Replace the default widget with a caller-provided renderer
    pub fn with_render(mut self, slot: impl Into<String>) -> Self {
        self.render_slot = Some(slot.into());
        self
    }

    /// Set the initial value for new records
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Set the textarea row count (ignored for other kinds)
    pub fn with_rows(mut self, rows: u32) -> Self {
        if let FieldKind::TextArea { rows: r } = &mut self.kind {
            *r = rows;
        }
        self
    }

    /// Replace the options of a select/multiselect (ignored for other kinds)
    pub fn with_options(mut self, new_options: Vec<SelectOption>) -> Self {
        match &mut self.kind {
            FieldKind::Select { options } | FieldKind::MultiSelect { options } => {
                *options = new_options;
            }
            _ => {}
        }
        self
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Value a new record starts with
    pub fn initial_value(&self) -> Value {
        self.default_value
            .clone()
            .unwrap_or_else(|| self.kind.empty_value())
    }

    /// Get the display label (falls back to formatted field name)
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            to_title_case(&self.name)
        } else {
            self.label.clone()
        }
    }

    /// Message recorded when a required value is missing
    pub fn required_message(&self) -> String {
        format!("{} is required", self.display_label())
    }

    /// Options of a select/multiselect field
    pub fn options(&self) -> &[SelectOption] {
        self.kind.options()
    }

    /// Check if this field holds an attachment
    pub fn is_file(&self) -> bool {
        matches!(self.kind, FieldKind::File { .. })
    }
}

impl Validatable for FieldDescriptor {
    fn validate(&self) -> EngineResult<()> {
        if self.name.is_empty() {
            return Err(EngineError::validation("Field name cannot be empty"));
        }

        match &self.kind {
            FieldKind::Select { options } | FieldKind::MultiSelect { options }
                if options.is_empty() && !self.disabled =>
            {
                Err(EngineError::field_validation(
                    &self.name,
                    "Select fields need at least one option",
                ))
            }
            FieldKind::Rating { max } if *max == 0 => Err(EngineError::field_validation(
                &self.name,
                "Rating needs a maximum of at least 1",
            )),
            FieldKind::Table { columns } if columns.is_empty() => Err(
                EngineError::field_validation(&self.name, "Table fields need at least one column"),
            ),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("disabled", &self.disabled)
            .field("rules", &self.rules)
            .field("has_validator", &self.validator.is_some())
            .field("render_slot", &self.render_slot)
            .finish()
    }
}

// ============================================================================
// FieldKind
// ============================================================================

/// Kind of a field, each variant carrying its own payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text input
    Text,
    /// Multi-line text area
    TextArea { rows: u32 },
    /// Email input
    Email,
    /// URL input
    Url,
    /// Telephone input
    Tel,
    /// Boolean checkbox
    Checkbox,
    /// Dropdown select
    Select { options: Vec<SelectOption> },
    /// Multi-select
    MultiSelect { options: Vec<SelectOption> },
    /// Date and time picker
    DateTime,
    /// Password input (masked)
    Password,
    /// File attachment; `accept` lists allowed extensions
    File { accept: Vec<String> },
    /// Editable table of rows
    Table { columns: Vec<TableColumn> },
    /// Star rating
    Rating { max: u8 },
    /// Salary range
    Salary { currencies: Vec<String> },
}

impl FieldKind {
    /// Short type name used in logs and CSS hooks
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::TextArea { .. } => "textarea",
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Tel => "tel",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select { .. } => "select",
            FieldKind::MultiSelect { .. } => "multiselect",
            FieldKind::DateTime => "datetime",
            FieldKind::Password => "password",
            FieldKind::File { .. } => "file",
            FieldKind::Table { .. } => "table",
            FieldKind::Rating { .. } => "rating",
            FieldKind::Salary { .. } => "salary",
        }
    }

    /// HTML input type for single-input kinds
    pub fn html_input_type(&self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Url => "url",
            FieldKind::Tel => "tel",
            FieldKind::Password => "password",
            FieldKind::DateTime => "datetime-local",
            FieldKind::Checkbox => "checkbox",
            FieldKind::File { .. } => "file",
            _ => "text",
        }
    }

    /// Check if this kind is rendered as a plain text input
    pub fn is_text_variant(&self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::Email | FieldKind::Url | FieldKind::Tel
        )
    }

    /// Options of a select/multiselect, empty for other kinds
    pub fn options(&self) -> &[SelectOption] {
        match self {
            FieldKind::Select { options } | FieldKind::MultiSelect { options } => options,
            _ => &[],
        }
    }

    /// Value an untouched widget of this kind holds
    pub fn empty_value(&self) -> Value {
        match self {
            FieldKind::Checkbox => Value::Bool(false),
            FieldKind::MultiSelect { .. } | FieldKind::Table { .. } => Value::Array(Vec::new()),
            _ => Value::Null,
        }
    }
}

impl Default for FieldKind {
    fn default() -> Self {
        FieldKind::Text
    }
}

// ============================================================================
// SelectOption
// ============================================================================

/// One entry of a select/multiselect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Value stored in form data
    pub value: Value,
    /// Display label
    pub label: String,
}

impl SelectOption {
    /// Create a new select option
    pub fn new(value: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose value and label are the same string
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value: Value::String(value),
        }
    }

    /// String key used by HTML `<option value>`
    pub fn key(&self) -> String {
        option_key(&self.value)
    }
}

/// String key of an option value (numbers and strings share one space)
pub fn option_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Find the option whose key matches the given string
pub fn option_for_key<'a>(options: &'a [SelectOption], key: &str) -> Option<&'a SelectOption> {
    options.iter().find(|o| o.key() == key)
}

// ============================================================================
// TableColumn
// ============================================================================

/// Column of a table field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Key of the cell within each row object
    pub key: String,
    /// Column header
    pub label: String,
}

impl TableColumn {
    /// Create a new column
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert a string to Title Case
pub(crate) fn to_title_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_builder() {
        let field = FieldDescriptor::email("email", "Email")
            .required()
            .with_placeholder("jane@example.com");

        assert!(field.required);
        assert_eq!(field.kind, FieldKind::Email);
        assert_eq!(field.rules, vec![Rule::Email]);
        assert_eq!(field.placeholder.as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_required_message_uses_label() {
        let field = FieldDescriptor::text("email", "Email").required();
        assert_eq!(field.required_message(), "Email is required");

        let unlabeled = FieldDescriptor::text("job_title", "");
        assert_eq!(unlabeled.required_message(), "Job Title is required");
    }

    #[test]
    fn test_initial_values() {
        assert_eq!(FieldDescriptor::checkbox("remote", "Remote").initial_value(), json!(false));
        assert_eq!(
            FieldDescriptor::multiselect("tags", "Tags", vec![SelectOption::plain("a")])
                .initial_value(),
            json!([])
        );
        assert_eq!(FieldDescriptor::text("name", "Name").initial_value(), Value::Null);
        assert_eq!(
            FieldDescriptor::text("status", "Status")
                .with_default("applied")
                .initial_value(),
            json!("applied")
        );
    }

    #[test]
    fn test_select_needs_options_unless_disabled() {
        let empty = FieldDescriptor::select("company", "Company", vec![]);
        assert!(empty.validate().is_err());

        let loading = FieldDescriptor::select("company", "Company", vec![]).disabled();
        assert!(loading.validate().is_ok());

        let filled = empty.with_options(vec![SelectOption::new(1, "Acme")]);
        assert!(filled.validate().is_ok());
    }

    #[test]
    fn test_table_needs_columns() {
        let table = FieldDescriptor::table("rounds", "Rounds", vec![]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_option_keys() {
        let numeric = SelectOption::new(3, "Acme");
        assert_eq!(numeric.key(), "3");
        let text = SelectOption::plain("applied");
        assert_eq!(text.key(), "applied");

        let options = vec![numeric, text];
        assert_eq!(option_for_key(&options, "3").map(|o| o.label.as_str()), Some("Acme"));
        assert!(option_for_key(&options, "4").is_none());
    }

    #[test]
    fn test_kind_serde_tagged() {
        let kind: FieldKind = serde_json::from_value(json!({"type": "rating", "max": 5})).unwrap();
        assert_eq!(kind, FieldKind::Rating { max: 5 });
        assert_eq!(kind.type_name(), "rating");
    }

    #[test]
    fn test_with_rows_only_affects_textarea() {
        let notes = FieldDescriptor::textarea("notes", "Notes").with_rows(8);
        assert_eq!(notes.kind, FieldKind::TextArea { rows: 8 });
        let name = FieldDescriptor::text("name", "Name").with_rows(8);
        assert_eq!(name.kind, FieldKind::Text);
    }

    #[test]
    fn test_to_title_case() {
        assert_eq!(to_title_case("applied_at"), "Applied At");
        assert_eq!(to_title_case("email"), "Email");
    }
}
