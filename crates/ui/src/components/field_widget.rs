//! # Field Widgets
//!
//! Renders one field descriptor either as an editable input or as its
//! read-only display value, and holds the render slots through which a
//! page overrides individual fields and fills custom layout blocks.
//!

use dioxus::prelude::*;
use jobtrack_core::value::value_to_text;
use jobtrack_core::{EngineError, FormData, RecordId, is_missing};
use jobtrack_schema::{DisplayValue, FieldDescriptor, FieldKind, SelectOption, option_for_key, option_key};
use serde_json::Value;
use std::collections::BTreeMap;

use super::inputs::{
    Checkbox, Choice, DateTimeInput, FieldFrame, FileInput, MultiSelect, RatingInput, SalaryInput,
    Select, TableInput, TextArea, TextInput, selected_keys,
};
use crate::file_ops;
use crate::state::{APP_STATE, BackendHandle, StatusLevel};

// ============================================================================
// Render Slots
// ============================================================================

/// What a field override renderer receives
#[derive(Clone, PartialEq)]
pub struct FieldSlot {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: Value,
    pub editing: bool,
    pub disabled: bool,
    pub on_change: EventHandler<Value>,
}

/// What a custom block renderer receives
#[derive(Clone, PartialEq)]
pub struct BlockSlot {
    pub key: String,
    pub data: FormData,
    pub editing: bool,
    pub fields: Vec<String>,
}

/// Renders a field in place of its default widget
pub type FieldRenderer = fn(FieldSlot) -> Element;

/// Renders a custom layout block
pub type BlockRenderer = fn(BlockSlot) -> Element;

/// Named renderers for field overrides and custom blocks
#[derive(Clone, Default, PartialEq)]
pub struct RenderSlots {
    fields: BTreeMap<String, FieldRenderer>,
    blocks: BTreeMap<String, BlockRenderer>,
}

impl RenderSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field override under a slot name
    pub fn with_field(mut self, slot: impl Into<String>, renderer: FieldRenderer) -> Self {
        self.fields.insert(slot.into(), renderer);
        self
    }

    /// Register a custom block renderer
    pub fn with_block(mut self, key: impl Into<String>, renderer: BlockRenderer) -> Self {
        self.blocks.insert(key.into(), renderer);
        self
    }

    /// Override for a descriptor, if it names a registered slot
    pub fn field(&self, field: &FieldDescriptor) -> Option<FieldRenderer> {
        field
            .render_slot
            .as_deref()
            .and_then(|slot| self.fields.get(slot))
            .copied()
    }

    /// Renderer for a custom block
    pub fn block(&self, key: &str) -> Option<BlockRenderer> {
        self.blocks.get(key).copied()
    }
}

// ============================================================================
// Field Widget
// ============================================================================

/// Properties for FieldWidget component
#[derive(Props, Clone, PartialEq)]
pub struct FieldWidgetProps {
    pub kind: FieldKind,

    /// Current value
    pub value: Value,

    #[props(default)]
    pub placeholder: Option<String>,

    #[props(default = false)]
    pub disabled: bool,

    #[props(default = false)]
    pub invalid: bool,

    /// Change handler receiving the new field value
    #[props(default)]
    pub on_change: EventHandler<Value>,
}

/// Editable input matching the field kind
#[component]
pub fn FieldWidget(props: FieldWidgetProps) -> Element {
    let on_change = props.on_change;
    let placeholder = props.placeholder.clone();

    match &props.kind {
        FieldKind::Text | FieldKind::Email | FieldKind::Url | FieldKind::Tel | FieldKind::Password => {
            rsx! {
                TextInput {
                    value: value_to_text(Some(&props.value)),
                    placeholder: placeholder,
                    input_type: props.kind.html_input_type().to_string(),
                    invalid: props.invalid,
                    disabled: props.disabled,
                    on_change: move |s: String| on_change.call(Value::String(s)),
                }
            }
        }
        FieldKind::TextArea { rows } => rsx! {
            TextArea {
                value: value_to_text(Some(&props.value)),
                placeholder: placeholder,
                rows: *rows,
                invalid: props.invalid,
                disabled: props.disabled,
                on_change: move |s: String| on_change.call(Value::String(s)),
            }
        },
        FieldKind::Checkbox => rsx! {
            Checkbox {
                checked: props.value.as_bool().unwrap_or(false),
                disabled: props.disabled,
                on_change: move |b: bool| on_change.call(Value::Bool(b)),
            }
        },
        FieldKind::Select { options } => {
            let options = options.clone();
            rsx! {
                Select {
                    value: selected_key(&props.value),
                    choices: Choice::from_options(&options),
                    placeholder: placeholder,
                    invalid: props.invalid,
                    disabled: props.disabled,
                    on_change: move |key: String| on_change.call(select_value(&options, &key)),
                }
            }
        }
        FieldKind::MultiSelect { options } => {
            let options = options.clone();
            rsx! {
                MultiSelect {
                    selected: selected_keys(&props.value),
                    choices: Choice::from_options(&options),
                    placeholder: placeholder,
                    disabled: props.disabled,
                    on_change: move |keys: Vec<String>| on_change.call(multiselect_value(&options, &keys)),
                }
            }
        }
        FieldKind::DateTime => rsx! {
            DateTimeInput {
                value: props.value.clone(),
                invalid: props.invalid,
                disabled: props.disabled,
                on_change: on_change,
            }
        },
        FieldKind::File { accept } => rsx! {
            FileInput {
                value: props.value.clone(),
                accept: accept.clone(),
                disabled: props.disabled,
                on_change: on_change,
            }
        },
        FieldKind::Table { columns } => rsx! {
            TableInput {
                value: props.value.clone(),
                columns: columns.clone(),
                disabled: props.disabled,
                on_change: on_change,
            }
        },
        FieldKind::Rating { max } => rsx! {
            RatingInput {
                value: rating_of(&props.value, *max),
                max: *max,
                disabled: props.disabled,
                on_change: move |n: u8| on_change.call(if n == 0 { Value::Null } else { Value::from(n) }),
            }
        },
        FieldKind::Salary { currencies } => rsx! {
            SalaryInput {
                value: props.value.clone(),
                currencies: currencies.clone(),
                invalid: props.invalid,
                disabled: props.disabled,
                on_change: on_change,
            }
        },
    }
}

/// Key of the selected option, empty when nothing is selected
pub fn selected_key(value: &Value) -> String {
    if is_missing(Some(value)) {
        String::new()
    } else {
        option_key(value)
    }
}

/// Stored value for a select key; unknown or empty keys clear the field
pub fn select_value(options: &[SelectOption], key: &str) -> Value {
    option_for_key(options, key)
        .map(|o| o.value.clone())
        .unwrap_or(Value::Null)
}

/// Stored value for selected multiselect keys
pub fn multiselect_value(options: &[SelectOption], keys: &[String]) -> Value {
    Value::Array(
        keys.iter()
            .filter_map(|k| option_for_key(options, k).map(|o| o.value.clone()))
            .collect(),
    )
}

fn rating_of(value: &Value, max: u8) -> u8 {
    value
        .as_f64()
        .map(|n| n.round().clamp(0.0, max as f64) as u8)
        .unwrap_or(0)
}

// ============================================================================
// Form Field
// ============================================================================

/// Properties for FormField component
#[derive(Props, Clone, PartialEq)]
pub struct FormFieldProps {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub value: Value,

    #[props(default)]
    pub placeholder: Option<String>,

    #[props(default)]
    pub help_text: Option<String>,

    #[props(default)]
    pub error: Option<String>,

    #[props(default = false)]
    pub required: bool,

    #[props(default = false)]
    pub disabled: bool,

    /// Override renderer from the page's render slots
    #[props(default)]
    pub renderer: Option<FieldRenderer>,

    #[props(default)]
    pub on_change: EventHandler<Value>,
}

/// Labelled editable field
#[component]
pub fn FormField(props: FormFieldProps) -> Element {
    let frame_label = match props.kind {
        FieldKind::Checkbox => None,
        _ => Some(props.label.clone()),
    };

    let body = match props.renderer {
        Some(render) => render(FieldSlot {
            name: props.name.clone(),
            label: props.label.clone(),
            kind: props.kind.clone(),
            value: props.value.clone(),
            editing: true,
            disabled: props.disabled,
            on_change: props.on_change,
        }),
        None => rsx! {
            if props.kind == FieldKind::Checkbox {
                Checkbox {
                    checked: props.value.as_bool().unwrap_or(false),
                    label: props.label.clone(),
                    disabled: props.disabled,
                    on_change: move |b: bool| props.on_change.call(Value::Bool(b)),
                }
            } else {
                FieldWidget {
                    kind: props.kind.clone(),
                    value: props.value.clone(),
                    placeholder: props.placeholder.clone(),
                    disabled: props.disabled,
                    invalid: props.error.is_some(),
                    on_change: props.on_change,
                }
            }
        },
    };

    rsx! {
        div {
            class: "form-field",
            "data-field": "{props.name}",
            FieldFrame {
                label: frame_label,
                help_text: props.help_text.clone(),
                error: props.error.clone(),
                required: props.required,
                {body}
            }
        }
    }
}

// ============================================================================
// Field Display
// ============================================================================

/// Properties for FieldDisplay component
#[derive(Props, Clone, PartialEq)]
pub struct FieldDisplayProps {
    pub label: String,
    pub display: DisplayValue,
}

/// Read-only label and value
#[component]
pub fn FieldDisplay(props: FieldDisplayProps) -> Element {
    rsx! {
        div {
            class: "field-display",
            dt {
                class: "text-xs font-medium uppercase tracking-wide text-slate-500 mb-1",
                "{props.label}"
            }
            dd {
                class: "text-sm text-slate-100 break-words",
                DisplayBody { display: props.display.clone() }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct DisplayBodyProps {
    display: DisplayValue,
}

#[component]
fn DisplayBody(props: DisplayBodyProps) -> Element {
    match props.display {
        DisplayValue::Empty => rsx! {
            span { class: "text-slate-500", "-" }
        },
        DisplayValue::Text(text) => rsx! {
            span { class: "whitespace-pre-wrap", "{text}" }
        },
        DisplayValue::Link { href, text } => rsx! {
            a {
                class: "text-indigo-400 hover:text-indigo-300 underline",
                href: "{href}",
                target: "_blank",
                "{text}"
            }
        },
        DisplayValue::Flag(flag) => rsx! {
            span {
                class: if flag { "text-emerald-400" } else { "text-slate-400" },
                if flag { "Yes" } else { "No" }
            }
        },
        DisplayValue::Labels(labels) => rsx! {
            div {
                class: "flex flex-wrap gap-1",
                for label in labels.iter() {
                    span {
                        class: "px-2 py-0.5 rounded-full text-xs bg-slate-700 text-slate-200",
                        "{label}"
                    }
                }
            }
        },
        stars @ DisplayValue::Stars { .. } => rsx! {
            span { class: "text-amber-400 tracking-wide", "{stars}" }
        },
        DisplayValue::File { id, filename, pending } => rsx! {
            FileDisplay { id, filename, pending }
        },
        DisplayValue::Table { headers, rows } => rsx! {
            table {
                class: "w-full text-sm border border-slate-700 rounded",
                thead {
                    tr {
                        for header in headers.iter() {
                            th { class: "text-left px-2 py-1 text-xs text-slate-400 bg-slate-800", "{header}" }
                        }
                    }
                }
                tbody {
                    for (i, row) in rows.iter().enumerate() {
                        tr {
                            key: "{i}",
                            for cell in row.iter() {
                                td { class: "px-2 py-1 border-t border-slate-700", "{cell}" }
                            }
                        }
                    }
                }
            }
        },
        DisplayValue::Masked => rsx! {
            span { class: "text-slate-400", {DisplayValue::Masked.to_text()} }
        },
    }
}

#[derive(Props, Clone, PartialEq)]
struct FileDisplayProps {
    id: Option<RecordId>,
    filename: String,
    pending: bool,
}

/// Attachment name with a download action
#[component]
fn FileDisplay(props: FileDisplayProps) -> Element {
    let backend = use_context::<BackendHandle>();
    let mut downloading = use_signal(|| false);

    let file_id = props.id.clone();
    let file_name = props.filename.clone();
    let download = move |_| {
        let Some(id) = file_id.clone() else {
            return;
        };
        let backend = backend.clone();
        let filename = file_name.clone();
        downloading.set(true);
        spawn(async move {
            match file_ops::save_attachment(backend.get().as_ref(), &id, &filename).await {
                Ok(path) => {
                    tracing::info!("Saved attachment to {}", path.display());
                    APP_STATE
                        .write()
                        .ui
                        .set_status(format!("Saved {}", path.display()), StatusLevel::Success);
                }
                Err(EngineError::Cancelled) => {}
                Err(e) if e.is_auth() => APP_STATE.write().expire_session(e.user_message()),
                Err(e) => {
                    tracing::error!("Download failed: {}", e);
                    APP_STATE.write().ui.set_status(e.user_message(), StatusLevel::Error);
                }
            }
            downloading.set(false);
        });
    };

    rsx! {
        div {
            class: "flex items-center gap-2",
            span { "📄" }
            span { "{props.filename}" }
            if props.pending {
                span { class: "text-xs text-amber-400", "(pending upload)" }
            } else if props.id.is_some() {
                button {
                    r#type: "button",
                    class: "px-2 py-0.5 text-xs bg-slate-700 hover:bg-slate-600 rounded transition-colors",
                    disabled: *downloading.read(),
                    onclick: download,
                    if *downloading.read() { "Downloading…" } else { "Download" }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
