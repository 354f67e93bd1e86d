//! # Layout Renderer
//!
//! Lays field groups out as rows of one to four columns, in either the
//! editable form or the read-only detail view.
//!
//! Field groups hold validators and so are not props; the renderers are
//! plain functions called from the modal body.

use dioxus::prelude::*;
use jobtrack_core::{FieldErrors, FormData};
use jobtrack_schema::{FieldDescriptor, FieldGroup, LayoutRow, display_value, layout_rows};
use serde_json::Value;

use super::field_widget::{BlockSlot, FieldDisplay, FieldSlot, FormField, RenderSlots};

/// Everything the form renderer needs besides the groups
#[derive(Clone)]
pub struct FormContext<'a> {
    pub data: &'a FormData,
    pub errors: &'a FieldErrors,
    pub slots: &'a RenderSlots,
    /// Disables every input, e.g. while submitting
    pub disabled: bool,
    /// Receives `(field name, new value)`
    pub on_change: EventHandler<(String, Value)>,
}

/// Grid class for a row with `columns` cells
pub fn grid_class(columns: usize) -> &'static str {
    match columns {
        0 | 1 => "grid grid-cols-1 gap-4",
        2 => "grid grid-cols-2 gap-4",
        3 => "grid grid-cols-3 gap-4",
        _ => "grid grid-cols-4 gap-4",
    }
}

// ============================================================================
// Form
// ============================================================================

/// Editable form for the groups
pub fn render_form(groups: &[FieldGroup], ctx: &FormContext<'_>) -> Element {
    let rows: Vec<Element> = layout_rows(groups)
        .into_iter()
        .map(|row| match row {
            LayoutRow::Fields { columns, fields } => rsx! {
                div {
                    class: grid_class(columns),
                    for field in fields {
                        {form_field(field, ctx)}
                    }
                }
            },
            LayoutRow::Custom { key, fields } => match ctx.slots.block(key) {
                Some(render) => render(block_slot(key, fields, ctx.data, true)),
                None => rsx! {
                    div {
                        class: "space-y-4",
                        for field in fields.iter() {
                            {form_field(field, ctx)}
                        }
                    }
                },
            },
        })
        .collect();

    rsx! {
        div {
            class: "form-layout space-y-4",
            {rows.into_iter()}
        }
    }
}

fn form_field(field: &FieldDescriptor, ctx: &FormContext<'_>) -> Element {
    let name = field.name.clone();
    let on_change = ctx.on_change;
    let value = ctx
        .data
        .get(&field.name)
        .cloned()
        .unwrap_or_else(|| field.kind.empty_value());

    rsx! {
        FormField {
            key: "{field.name}",
            name: field.name.clone(),
            label: field.label.clone(),
            kind: field.kind.clone(),
            value,
            placeholder: field.placeholder.clone(),
            help_text: field.help_text.clone(),
            error: ctx.errors.get(&field.name).map(str::to_string),
            required: field.required,
            disabled: ctx.disabled || field.disabled,
            renderer: ctx.slots.field(field),
            on_change: move |v: Value| on_change.call((name.clone(), v)),
        }
    }
}

// ============================================================================
// View
// ============================================================================

/// Read-only detail view for the groups
pub fn render_view(groups: &[FieldGroup], data: &FormData, slots: &RenderSlots) -> Element {
    let rows: Vec<Element> = layout_rows(groups)
        .into_iter()
        .map(|row| match row {
            LayoutRow::Fields { columns, fields } => rsx! {
                dl {
                    class: grid_class(columns),
                    for field in fields {
                        {view_field(field, data, slots)}
                    }
                }
            },
            LayoutRow::Custom { key, fields } => match slots.block(key) {
                Some(render) => render(block_slot(key, fields, data, false)),
                None => rsx! {
                    dl {
                        class: "space-y-4",
                        for field in fields.iter() {
                            {view_field(field, data, slots)}
                        }
                    }
                },
            },
        })
        .collect();

    rsx! {
        div {
            class: "view-layout space-y-5",
            {rows.into_iter()}
        }
    }
}

fn view_field(field: &FieldDescriptor, data: &FormData, slots: &RenderSlots) -> Element {
    if let Some(render) = slots.field(field) {
        let body = render(FieldSlot {
            name: field.name.clone(),
            label: field.label.clone(),
            kind: field.kind.clone(),
            value: data.get(&field.name).cloned().unwrap_or(Value::Null),
            editing: false,
            disabled: true,
            on_change: EventHandler::default(),
        });
        return rsx! {
            div {
                key: "{field.name}",
                class: "field-display",
                dt {
                    class: "text-xs font-medium uppercase tracking-wide text-slate-500 mb-1",
                    "{field.label}"
                }
                dd { {body} }
            }
        };
    }

    rsx! {
        FieldDisplay {
            key: "{field.name}",
            label: field.label.clone(),
            display: display_value(field, data.get(&field.name)),
        }
    }
}

fn block_slot(key: &str, fields: &[FieldDescriptor], data: &FormData, editing: bool) -> BlockSlot {
    BlockSlot {
        key: key.to_string(),
        data: data.clone(),
        editing,
        fields: fields.iter().map(|f| f.name.clone()).collect(),
    }
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
    fn test_grid_class() {
        assert_eq!(grid_class(1), "grid grid-cols-1 gap-4");
        assert_eq!(grid_class(3), "grid grid-cols-3 gap-4");
        assert_eq!(grid_class(9), "grid grid-cols-4 gap-4");
    }

    #[test]
    fn test_block_slot_carries_field_names() {
        let fields = vec![FieldDescriptor::text("a", "A"), FieldDescriptor::text("b", "B")];
        let data = json!({"id": 1}).as_object().cloned().unwrap_or_default();
        let slot = block_slot("contacts", &fields, &data, false);
        assert_eq!(slot.key, "contacts");
        assert_eq!(slot.fields, vec!["a", "b"]);
        assert!(!slot.editing);
        assert_eq!(slot.data, data);
    }
}
