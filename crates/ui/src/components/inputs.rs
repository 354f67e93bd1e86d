//! # Input Components
//!
//! Reusable form input components for the Jobtrack UI.
//!
//! This module provides one styled input per field kind:
//! - **TextInput**: Single-line text (also email, url, tel and password)
//! - **TextArea**: Multi-line text input
//! - **Select** / **MultiSelect**: Option pickers
//! - **Checkbox**: Boolean checkbox
//! - **ButtonGroup**: Mutually exclusive options as buttons
//! - **RatingInput**: Star rating
//! - **SalaryInput**: Salary range with currency and period
//! - **DateTimeInput**: Local date and time
//! - **FileInput**: Attachment picker
//! - **TableInput**: Editable rows
//!
//! Inputs do not render their own label; wrap them in a [`FieldFrame`].
//!

use dioxus::prelude::*;
use jobtrack_client::PendingUpload;
use jobtrack_core::{EngineError, RecordId, is_missing};
use jobtrack_schema::{SelectOption, TableColumn, option_key};
use serde_json::{Map, Value};

use crate::file_ops;
use crate::state::{APP_STATE, StatusLevel};

// ============================================================================
// Choices
// ============================================================================

/// One option of a select-like input, keyed by string
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub key: String,
    pub label: String,
    pub disabled: bool,
}

impl Choice {
    /// Create an enabled choice
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            disabled: false,
        }
    }

    /// Convert descriptor options
    pub fn from_options(options: &[SelectOption]) -> Vec<Choice> {
        options
            .iter()
            .map(|o| Choice::new(o.key(), o.label.clone()))
            .collect()
    }
}

// ============================================================================
// Field Frame
// ============================================================================

/// Properties for FieldFrame component
#[derive(Props, Clone, PartialEq)]
pub struct FieldFrameProps {
    /// Label text
    #[props(default)]
    pub label: Option<String>,

    /// Help text shown below the input
    #[props(default)]
    pub help_text: Option<String>,

    /// Error message, possibly several lines
    #[props(default)]
    pub error: Option<String>,

    /// Whether the field is required
    #[props(default = false)]
    pub required: bool,

    /// The input
    pub children: Element,
}

/// Label, input and error/help line of one form field
#[component]
pub fn FieldFrame(props: FieldFrameProps) -> Element {
    rsx! {
        div {
            class: "input-group",

            // Label
            if let Some(label) = &props.label {
                label {
                    class: "block text-sm font-medium text-slate-300 mb-1.5",
                    "{label}"
                    if props.required {
                        span { class: "text-rose-400 ml-0.5", "*" }
                    }
                }
            }

            {props.children}

            // Help text or error
            if let Some(error) = &props.error {
                for line in error.lines() {
                    p {
                        class: "mt-1 text-xs text-rose-400",
                        "{line}"
                    }
                }
            } else if let Some(help) = &props.help_text {
                p {
                    class: "mt-1 text-xs text-slate-500",
                    "{help}"
                }
            }
        }
    }
}

// ============================================================================
// Text Input Component
// ============================================================================

/// Properties for TextInput component
#[derive(Props, Clone, PartialEq)]
pub struct TextInputProps {
    /// Input value
    pub value: String,

    /// Placeholder text
    #[props(default)]
    pub placeholder: Option<String>,

    /// Whether the field has an error
    #[props(default = false)]
    pub invalid: bool,

    /// Whether the input is disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Input type (text, email, password, etc.)
    #[props(default = "text".to_string())]
    pub input_type: String,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<String>,
}

/// Single-line text input component
#[component]
pub fn TextInput(props: TextInputProps) -> Element {
    let input_class = build_input_class(props.invalid, props.disabled);

    rsx! {
        input {
            class: "{input_class}",
            r#type: "{props.input_type}",
            value: "{props.value}",
            placeholder: props.placeholder.as_deref().unwrap_or(""),
            disabled: props.disabled,
            autocomplete: if props.input_type == "password" { "new-password" } else { "off" },
            oninput: move |e| props.on_change.call(e.value()),
        }
    }
}

// ============================================================================
// Text Area Component
// ============================================================================

/// Properties for TextArea component
#[derive(Props, Clone, PartialEq)]
pub struct TextAreaProps {
    /// Input value
    pub value: String,

    /// Placeholder text
    #[props(default)]
    pub placeholder: Option<String>,

    /// Number of visible rows
    #[props(default = 3)]
    pub rows: u32,

    /// Whether the field has an error
    #[props(default = false)]
    pub invalid: bool,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<String>,
}

/// Multi-line text input component
#[component]
pub fn TextArea(props: TextAreaProps) -> Element {
    let textarea_class = build_textarea_class(props.invalid, props.disabled);

    rsx! {
        textarea {
            class: "{textarea_class}",
            rows: "{props.rows}",
            placeholder: props.placeholder.as_deref().unwrap_or(""),
            disabled: props.disabled,
            oninput: move |e| props.on_change.call(e.value()),
            "{props.value}"
        }
    }
}

// ============================================================================
// Select Component
// ============================================================================

/// Properties for Select component
#[derive(Props, Clone, PartialEq)]
pub struct SelectProps {
    /// Key of the selected choice (empty for none)
    pub value: String,

    /// Available choices
    pub choices: Vec<Choice>,

    /// Placeholder (shown when no selection)
    #[props(default)]
    pub placeholder: Option<String>,

    /// Whether the field has an error
    #[props(default = false)]
    pub invalid: bool,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler; receives the choice key, empty for none
    #[props(default)]
    pub on_change: EventHandler<String>,
}

/// Dropdown select component
#[component]
pub fn Select(props: SelectProps) -> Element {
    let border_color = if props.invalid {
        "border-color: rgb(244 63 94);"
    } else {
        "border-color: rgb(51 65 85);"
    };

    let disabled_style = if props.disabled {
        "opacity: 0.5; cursor: not-allowed;"
    } else {
        "cursor: pointer;"
    };

    let placeholder = props.placeholder.clone().unwrap_or_else(|| "Select…".to_string());

    rsx! {
        select {
            class: "w-full rounded-lg text-sm transition-colors focus:outline-none focus:ring-2 focus:ring-indigo-500/30",
            style: "
                padding: 0.5rem 2.5rem 0.5rem 0.75rem;
                background-color: rgb(30 41 59);
                color: rgb(241 245 249);
                border: 1px solid;
                {border_color}
                {disabled_style}
                appearance: none;
            ",
            disabled: props.disabled,
            onchange: move |e| props.on_change.call(e.value()),

            // Empty choice
            option {
                value: "",
                selected: props.value.is_empty(),
                style: "color: rgb(148 163 184);",
                "{placeholder}"
            }

            for choice in &props.choices {
                option {
                    key: "{choice.key}",
                    value: "{choice.key}",
                    disabled: choice.disabled,
                    selected: props.value == choice.key,
                    "{choice.label}"
                }
            }
        }
    }
}

// ============================================================================
// Multi Select Component
// ============================================================================

/// Properties for MultiSelect component
#[derive(Props, Clone, PartialEq)]
pub struct MultiSelectProps {
    /// Keys of the selected choices, in selection order
    pub selected: Vec<String>,

    /// Available choices
    pub choices: Vec<Choice>,

    /// Shown when there is nothing to choose from
    #[props(default)]
    pub placeholder: Option<String>,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<Vec<String>>,
}

/// Multi-select rendered as toggleable chips
#[component]
pub fn MultiSelect(props: MultiSelectProps) -> Element {
    if props.choices.is_empty() {
        let placeholder = props.placeholder.clone().unwrap_or_default();
        return rsx! {
            p { class: "text-sm text-slate-500 italic", "{placeholder}" }
        };
    }

    rsx! {
        div {
            class: "flex flex-wrap gap-2",
            for choice in props.choices.iter() {
                button {
                    key: "{choice.key}",
                    r#type: "button",
                    class: "px-2.5 py-1 rounded-full text-xs border transition-colors",
                    class: if props.selected.contains(&choice.key) {
                        "bg-indigo-600 border-indigo-500 text-white"
                    } else {
                        "bg-slate-800 border-slate-600 text-slate-300 hover:border-slate-400"
                    },
                    disabled: props.disabled || choice.disabled,
                    onclick: {
                        let key = choice.key.clone();
                        let selected = props.selected.clone();
                        move |_| props.on_change.call(toggle_key(&selected, &key))
                    },
                    "{choice.label}"
                }
            }
        }
    }
}

// ============================================================================
// Checkbox Component
// ============================================================================

/// Properties for Checkbox component
#[derive(Props, Clone, PartialEq)]
pub struct CheckboxProps {
    /// Whether checked
    pub checked: bool,

    /// Label text
    #[props(default)]
    pub label: Option<String>,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<bool>,
}

/// Checkbox input component
#[component]
pub fn Checkbox(props: CheckboxProps) -> Element {
    let checkbox_class = build_checkbox_class(props.disabled);

    rsx! {
        label {
            class: "checkbox-wrapper inline-flex items-start gap-2 cursor-pointer",
            class: if props.disabled { "opacity-50 cursor-not-allowed" } else { "" },

            div {
                class: "relative flex items-center justify-center mt-0.5",

                input {
                    class: "sr-only peer",
                    r#type: "checkbox",
                    checked: props.checked,
                    disabled: props.disabled,
                    onchange: move |_| {
                        if !props.disabled {
                            props.on_change.call(!props.checked);
                        }
                    },
                }

                div {
                    class: "{checkbox_class}",
                    if props.checked {
                        span { class: "text-white text-xs leading-none", "✓" }
                    }
                }
            }

            if let Some(label) = &props.label {
                span { class: "text-sm text-slate-200", "{label}" }
            }
        }
    }
}

// ============================================================================
// Button Group Component
// ============================================================================

/// Properties for ButtonGroup component
#[derive(Props, Clone, PartialEq)]
pub struct ButtonGroupProps {
    /// Selected key
    pub value: String,

    /// Available choices
    pub choices: Vec<Choice>,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<String>,
}

/// Button group for mutually exclusive options
#[component]
pub fn ButtonGroup(props: ButtonGroupProps) -> Element {
    rsx! {
        div {
            class: "button-group inline-flex flex-wrap rounded-lg overflow-hidden border border-slate-700",

            for (i, choice) in props.choices.iter().enumerate() {
                button {
                    key: "{choice.key}",
                    r#type: "button",
                    class: "px-3 py-1.5 text-sm transition-colors",
                    class: if props.value == choice.key {
                        "bg-indigo-600 text-white"
                    } else {
                        "bg-slate-800 text-slate-300 hover:bg-slate-700"
                    },
                    class: if i > 0 { "border-l border-slate-700" } else { "" },
                    disabled: props.disabled || choice.disabled,
                    onclick: {
                        let key = choice.key.clone();
                        move |_| props.on_change.call(key.clone())
                    },
                    "{choice.label}"
                }
            }
        }
    }
}

// ============================================================================
// Rating Component
// ============================================================================

/// Properties for RatingInput component
#[derive(Props, Clone, PartialEq)]
pub struct RatingInputProps {
    /// Current rating, 0 for none
    pub value: u8,

    /// Number of stars
    #[props(default = 5)]
    pub max: u8,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<u8>,
}

/// Star rating; clicking the current rating clears it
#[component]
pub fn RatingInput(props: RatingInputProps) -> Element {
    rsx! {
        div {
            class: "flex items-center gap-1",
            for star in 1..=props.max {
                button {
                    key: "{star}",
                    r#type: "button",
                    class: "text-xl leading-none transition-colors",
                    class: if star <= props.value { "text-amber-400" } else { "text-slate-600 hover:text-slate-400" },
                    disabled: props.disabled,
                    title: "{star}",
                    onclick: move |_| {
                        let next = if star == props.value { 0 } else { star };
                        props.on_change.call(next);
                    },
                    if star <= props.value { "★" } else { "☆" }
                }
            }
        }
    }
}

// ============================================================================
// Salary Component
// ============================================================================

/// Salary periods offered by the salary input
pub const SALARY_PERIODS: [(&str, &str); 3] =
    [("year", "per year"), ("month", "per month"), ("hour", "per hour")];

/// Properties for SalaryInput component
#[derive(Props, Clone, PartialEq)]
pub struct SalaryInputProps {
    /// `{min, max, currency, period}` or null
    pub value: Value,

    /// Offered currencies
    pub currencies: Vec<String>,

    /// Whether the field has an error
    #[props(default = false)]
    pub invalid: bool,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<Value>,
}

/// Salary range input
#[component]
pub fn SalaryInput(props: SalaryInputProps) -> Element {
    let input_class = build_input_class(props.invalid, props.disabled);
    let min = salary_part(&props.value, "min");
    let max = salary_part(&props.value, "max");
    let currency = salary_part(&props.value, "currency");
    let period = salary_part(&props.value, "period");
    let currencies: Vec<Choice> = props.currencies.iter().map(|c| Choice::new(c, c)).collect();
    let periods: Vec<Choice> = SALARY_PERIODS.iter().map(|(k, l)| Choice::new(*k, *l)).collect();

    let update = move |part: &'static str, raw: String| {
        props.on_change.call(set_salary_part(&props.value, part, &raw));
    };
    let update_min = update.clone();
    let update_max = update.clone();
    let update_currency = update.clone();
    let update_period = update;

    rsx! {
        div {
            class: "grid grid-cols-4 gap-2",
            input {
                class: "{input_class}",
                r#type: "number",
                min: "0",
                placeholder: "Min",
                value: "{min}",
                disabled: props.disabled,
                oninput: move |e| update_min("min", e.value()),
            }
            input {
                class: "{input_class}",
                r#type: "number",
                min: "0",
                placeholder: "Max",
                value: "{max}",
                disabled: props.disabled,
                oninput: move |e| update_max("max", e.value()),
            }
            Select {
                value: currency,
                choices: currencies,
                placeholder: Some("Currency".to_string()),
                disabled: props.disabled,
                on_change: move |v| update_currency("currency", v),
            }
            Select {
                value: period,
                choices: periods,
                placeholder: Some("Period".to_string()),
                disabled: props.disabled,
                on_change: move |v| update_period("period", v),
            }
        }
    }
}

/// Text of one part of a salary value
pub fn salary_part(value: &Value, part: &str) -> String {
    match value.get(part) {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Set one part of a salary value; amounts are stored as numbers and a
/// range with nothing left in it becomes null
pub fn set_salary_part(value: &Value, part: &str, raw: &str) -> Value {
    let mut salary = value.as_object().cloned().unwrap_or_default();
    let raw = raw.trim();

    let parsed = match part {
        "min" | "max" => raw
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(number_value),
        _ if raw.is_empty() => None,
        _ => Some(Value::String(raw.to_string())),
    };
    match parsed {
        Some(v) => {
            salary.insert(part.to_string(), v);
        }
        None => {
            salary.remove(part);
        }
    }

    if salary.get("min").is_none() && salary.get("max").is_none() && salary.len() <= 2 {
        let only_units = salary.keys().all(|k| k == "currency" || k == "period");
        if only_units && is_missing(salary.get("currency")) && is_missing(salary.get("period")) {
            return Value::Null;
        }
    }
    Value::Object(salary)
}

fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n <= i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

// ============================================================================
// Date Time Component
// ============================================================================

/// Properties for DateTimeInput component
#[derive(Props, Clone, PartialEq)]
pub struct DateTimeInputProps {
    /// ISO 8601 string or null
    pub value: Value,

    /// Whether the field has an error
    #[props(default = false)]
    pub invalid: bool,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<Value>,
}

/// Local date and time picker
#[component]
pub fn DateTimeInput(props: DateTimeInputProps) -> Element {
    let input_class = build_input_class(props.invalid, props.disabled);
    let local = to_datetime_local(&props.value);

    rsx! {
        input {
            class: "{input_class}",
            r#type: "datetime-local",
            value: "{local}",
            disabled: props.disabled,
            oninput: move |e| props.on_change.call(from_datetime_local(&e.value())),
        }
    }
}

/// Convert a stored timestamp to the `datetime-local` input format
pub fn to_datetime_local(value: &Value) -> String {
    let Some(text) = value.as_str().filter(|s| !s.is_empty()) else {
        return String::new();
    };
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(text) {
        return dt.naive_local().format("%Y-%m-%dT%H:%M").to_string();
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(text, format) {
            return dt.format("%Y-%m-%dT%H:%M").to_string();
        }
    }
    text.to_string()
}

/// Convert a `datetime-local` input value to the stored form
pub fn from_datetime_local(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }
    match chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        Ok(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        Err(_) => Value::String(raw.to_string()),
    }
}

// ============================================================================
// File Component
// ============================================================================

/// What a file field currently holds, for display
#[derive(Debug, Clone, PartialEq)]
pub enum FileState {
    /// Nothing attached
    Empty,
    /// Chosen but not uploaded yet
    Pending { filename: String, size: u64 },
    /// Stored attachment
    Attached { id: Option<RecordId>, filename: String },
}

impl FileState {
    /// Describe a file field value
    pub fn of(value: &Value) -> Self {
        if let Some(upload) = PendingUpload::from_form_value(value) {
            return FileState::Pending {
                filename: upload.filename,
                size: upload.size,
            };
        }
        match value {
            Value::Object(obj) => {
                let id = obj.get("id").and_then(RecordId::from_value);
                let filename = obj
                    .get("filename")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| id.as_ref().map(|id| format!("File #{}", id)))
                    .unwrap_or_default();
                FileState::Attached { id, filename }
            }
            other => match RecordId::from_value(other) {
                Some(id) => FileState::Attached {
                    filename: format!("File #{}", id),
                    id: Some(id),
                },
                None => FileState::Empty,
            },
        }
    }
}

/// Properties for FileInput component
#[derive(Props, Clone, PartialEq)]
pub struct FileInputProps {
    /// Attached id/record, pending upload or null
    pub value: Value,

    /// Accepted extensions
    #[props(default)]
    pub accept: Vec<String>,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<Value>,
}

/// Attachment picker; removing sends an explicit null
#[component]
pub fn FileInput(props: FileInputProps) -> Element {
    let mut picking = use_signal(|| false);
    let state = FileState::of(&props.value);
    let accept_text = props.accept.join(", ");

    let pick = move |_| {
        let accept = props.accept.clone();
        picking.set(true);
        spawn(async move {
            match file_ops::pick_attachment(&accept).await {
                Ok(upload) => props.on_change.call(upload.to_form_value()),
                Err(EngineError::Cancelled) => tracing::debug!("Attachment dialog cancelled"),
                Err(e) => {
                    tracing::warn!("Could not attach file: {}", e);
                    APP_STATE
                        .write()
                        .ui
                        .set_status(e.user_message(), StatusLevel::Warning);
                }
            }
            picking.set(false);
        });
    };

    rsx! {
        div {
            class: "flex items-center gap-2 px-3 py-2 bg-slate-800 border border-slate-700 rounded-lg",

            span { class: "text-lg", "📎" }

            div {
                class: "flex-1 min-w-0 text-sm truncate",
                match &state {
                    FileState::Empty => rsx! {
                        span { class: "text-slate-500", "No file" }
                    },
                    FileState::Pending { filename, size } => rsx! {
                        span { class: "text-slate-200", "{filename}" }
                        span { class: "ml-2 text-xs text-amber-400", {format!("{}, not uploaded yet", format_size(*size))} }
                    },
                    FileState::Attached { filename, .. } => rsx! {
                        span { class: "text-slate-200", "{filename}" }
                    },
                }
            }

            button {
                r#type: "button",
                class: "px-2 py-1 text-xs bg-slate-700 hover:bg-slate-600 rounded transition-colors",
                disabled: props.disabled || *picking.read(),
                title: if accept_text.is_empty() { "Any file".to_string() } else { accept_text.clone() },
                onclick: pick,
                if *picking.read() { "Opening…" } else { "Choose…" }
            }

            if state != FileState::Empty {
                button {
                    r#type: "button",
                    class: "px-2 py-1 text-xs text-rose-300 hover:bg-rose-500/20 rounded transition-colors",
                    disabled: props.disabled,
                    onclick: move |_| props.on_change.call(Value::Null),
                    "Remove"
                }
            }
        }
    }
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}

// ============================================================================
// Table Component
// ============================================================================

/// Properties for TableInput component
#[derive(Props, Clone, PartialEq)]
pub struct TableInputProps {
    /// Array of row objects
    pub value: Value,

    /// Columns
    pub columns: Vec<TableColumn>,

    /// Whether disabled
    #[props(default = false)]
    pub disabled: bool,

    /// Change handler
    #[props(default)]
    pub on_change: EventHandler<Value>,
}

/// Editable table with add/remove row actions
#[component]
pub fn TableInput(props: TableInputProps) -> Element {
    let rows = table_rows(&props.value);
    let cell_class = build_input_class(false, props.disabled);

    rsx! {
        div {
            class: "space-y-2",
            table {
                class: "w-full text-sm",
                thead {
                    tr {
                        for column in props.columns.iter() {
                            th {
                                key: "{column.key}",
                                class: "text-left text-xs font-medium text-slate-400 pb-1",
                                "{column.label}"
                            }
                        }
                        th { class: "w-8" }
                    }
                }
                tbody {
                    for (index, row) in rows.iter().enumerate() {
                        tr {
                            key: "{index}",
                            for column in props.columns.iter() {
                                td {
                                    key: "{column.key}",
                                    class: "pr-2 pb-1",
                                    input {
                                        class: "{cell_class}",
                                        r#type: "text",
                                        value: cell_text(row, &column.key),
                                        disabled: props.disabled,
                                        oninput: {
                                            let key = column.key.clone();
                                            let table = props.value.clone();
                                            move |e: FormEvent| {
                                                props.on_change.call(set_cell(&table, index, &key, &e.value()))
                                            }
                                        },
                                    }
                                }
                            }
                            td {
                                button {
                                    r#type: "button",
                                    class: "p-1 text-slate-400 hover:text-rose-400",
                                    disabled: props.disabled,
                                    title: "Remove row",
                                    onclick: {
                                        let table = props.value.clone();
                                        move |_| props.on_change.call(remove_row(&table, index))
                                    },
                                    "✕"
                                }
                            }
                        }
                    }
                }
            }

            button {
                r#type: "button",
                class: "px-2 py-1 text-xs bg-slate-700 hover:bg-slate-600 rounded transition-colors",
                disabled: props.disabled,
                onclick: {
                    let table = props.value.clone();
                    let columns = props.columns.clone();
                    move |_| props.on_change.call(add_row(&table, &columns))
                },
                "+ Add row"
            }
        }
    }
}

/// Rows of a table value; non-object entries are skipped
pub fn table_rows(value: &Value) -> Vec<Map<String, Value>> {
    value
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r.as_object().cloned()).collect())
        .unwrap_or_default()
}

fn cell_text(row: &Map<String, Value>, key: &str) -> String {
    jobtrack_core::value::value_to_text(row.get(key))
}

/// Table value with one cell replaced
pub fn set_cell(value: &Value, row: usize, key: &str, text: &str) -> Value {
    let mut rows = table_rows(value);
    if let Some(r) = rows.get_mut(row) {
        r.insert(key.to_string(), Value::String(text.to_string()));
    }
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

/// Table value with an empty row appended
pub fn add_row(value: &Value, columns: &[TableColumn]) -> Value {
    let mut rows = table_rows(value);
    rows.push(
        columns
            .iter()
            .map(|c| (c.key.clone(), Value::String(String::new())))
            .collect(),
    );
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

/// Table value without the given row
pub fn remove_row(value: &Value, row: usize) -> Value {
    let mut rows = table_rows(value);
    if row < rows.len() {
        rows.remove(row);
    }
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Selected keys of a multiselect value
pub fn selected_keys(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| items.iter().map(option_key).collect())
        .unwrap_or_default()
}

/// Toggle `key` in a selection, keeping selection order
pub fn toggle_key(selected: &[String], key: &str) -> Vec<String> {
    if selected.iter().any(|k| k == key) {
        selected.iter().filter(|k| *k != key).cloned().collect()
    } else {
        let mut next = selected.to_vec();
        next.push(key.to_string());
        next
    }
}

/// Build input class string
fn build_input_class(invalid: bool, disabled: bool) -> String {
    let mut classes = vec![
        "w-full",
        "px-3",
        "py-2",
        "bg-slate-800",
        "border",
        "rounded-lg",
        "text-sm",
        "text-slate-100",
        "placeholder-slate-500",
        "transition-colors",
        "focus:outline-none",
        "focus:ring-2",
    ];

    if invalid {
        classes.push("border-rose-500");
        classes.push("focus:ring-rose-500/30");
        classes.push("focus:border-rose-500");
    } else {
        classes.push("border-slate-700");
        classes.push("focus:ring-indigo-500/30");
        classes.push("focus:border-indigo-500");
    }

    if disabled {
        classes.push("opacity-50");
        classes.push("cursor-not-allowed");
    }

    classes.join(" ")
}

/// Build textarea class string
fn build_textarea_class(invalid: bool, disabled: bool) -> String {
    let mut class = build_input_class(invalid, disabled);
    class.push_str(" resize-y");
    class
}

/// Build checkbox class string
fn build_checkbox_class(disabled: bool) -> String {
    let mut classes = vec![
        "w-4",
        "h-4",
        "rounded",
        "border-2",
        "transition-colors",
        "flex",
        "items-center",
        "justify-center",
        "peer-checked:bg-indigo-600",
        "peer-checked:border-indigo-600",
    ];

    if disabled {
        classes.push("border-slate-600");
        classes.push("bg-slate-700");
    } else {
        classes.push("border-slate-500");
        classes.push("bg-slate-800");
        classes.push("hover:border-slate-400");
    }

    classes.join(" ")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_build_input_class() {
        let class = build_input_class(false, false);
        assert!(class.contains("border-slate-700"));
        assert!(!class.contains("border-rose-500"));
        assert!(!class.contains("opacity-50"));
    }

    #[test]
    fn test_build_input_class_error_and_disabled() {
        let class = build_input_class(true, true);
        assert!(class.contains("border-rose-500"));
        assert!(class.contains("cursor-not-allowed"));
    }

    #[test]
    fn test_choices_from_options() {
        let choices = Choice::from_options(&[
            SelectOption::new(3, "Acme"),
            SelectOption::plain("Software"),
        ]);
        assert_eq!(choices[0], Choice::new(option_key(&json!(3)), "Acme"));
        assert_eq!(choices[1].label, "Software");
    }

    #[test]
    fn test_toggle_key_keeps_order() {
        let selected = vec!["remote".to_string(), "contract".to_string()];
        assert_eq!(toggle_key(&selected, "hybrid"), vec!["remote", "contract", "hybrid"]);
        assert_eq!(toggle_key(&selected, "remote"), vec!["contract"]);
    }

    #[test]
    fn test_salary_parts() {
        let salary = set_salary_part(&Value::Null, "min", "50000");
        let salary = set_salary_part(&salary, "currency", "EUR");
        assert_eq!(salary, json!({"min": 50000, "currency": "EUR"}));
        assert_eq!(salary_part(&salary, "min"), "50000");

        let salary = set_salary_part(&salary, "min", "");
        assert_eq!(salary, json!({"currency": "EUR"}));
    }

    #[test]
    fn test_salary_cleared_becomes_null() {
        let salary = set_salary_part(&json!({"max": 10}), "max", "");
        assert_eq!(salary, Value::Null);
    }

    #[test]
    fn test_salary_rejects_negative_amounts() {
        let salary = set_salary_part(&json!({"min": 10}), "min", "-5");
        assert_eq!(salary, Value::Null);
    }

    #[test]
    fn test_datetime_local_conversion() {
        assert_eq!(to_datetime_local(&json!("2024-05-01T09:30:00")), "2024-05-01T09:30");
        assert_eq!(to_datetime_local(&json!("2024-05-01T09:30:00+00:00")), "2024-05-01T09:30");
        assert_eq!(to_datetime_local(&Value::Null), "");
        assert_eq!(from_datetime_local("2024-05-01T09:30"), json!("2024-05-01T09:30:00"));
        assert_eq!(from_datetime_local(""), Value::Null);
    }

    #[test]
    fn test_file_state() {
        let upload = PendingUpload::from_bytes("cv.pdf", b"%PDF", "application/pdf");
        assert!(matches!(
            FileState::of(&upload.to_form_value()),
            FileState::Pending { ref filename, .. } if filename == "cv.pdf"
        ));
        assert_eq!(
            FileState::of(&json!({"id": 4, "filename": "letter.pdf"})),
            FileState::Attached {
                id: Some(RecordId::Int(4)),
                filename: "letter.pdf".to_string(),
            }
        );
        assert_eq!(
            FileState::of(&json!(9)),
            FileState::Attached {
                id: Some(RecordId::Int(9)),
                filename: "File #9".to_string(),
            }
        );
        assert_eq!(FileState::of(&Value::Null), FileState::Empty);
    }

    #[test]
    fn test_table_editing() {
        let columns = vec![TableColumn::new("question", "Question")];
        let table = add_row(&Value::Null, &columns);
        let table = set_cell(&table, 0, "question", "Why us?");
        let table = add_row(&table, &columns);
        assert_eq!(table, json!([{"question": "Why us?"}, {"question": ""}]));

        let table = remove_row(&table, 0);
        assert_eq!(table, json!([{"question": ""}]));
        assert_eq!(remove_row(&table, 5), table);
    }

    #[test]
    fn test_selected_keys() {
        assert_eq!(selected_keys(&json!(["a", "b"])), vec![option_key(&json!("a")), option_key(&json!("b"))]);
        assert!(selected_keys(&Value::Null).is_empty());
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
    }
}
