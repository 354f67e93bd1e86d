//! Render slot implementations used by the record pages
//!
//! - `status_picker`: application status as a button group / colored badge
//! - `company_contacts`, `application_interviews`: records pointing at
//!   the one shown

use dioxus::prelude::*;
use jobtrack_core::RecordId;
use serde_json::Value;

use crate::components::field_widget::{BlockSlot, FieldSlot, RenderSlots, select_value, selected_key};
use crate::components::inputs::{ButtonGroup, Choice};
use crate::entities::{
    APPLICATION_INTERVIEWS_SLOT, COMPANY_CONTACTS_SLOT, EntityKind, STATUS_PICKER_SLOT,
    related_records,
};
use crate::state::{APP_STATE, Dialog};

/// Slots every record modal is rendered with
pub fn entity_slots() -> RenderSlots {
    RenderSlots::new()
        .with_field(STATUS_PICKER_SLOT, status_picker)
        .with_block(COMPANY_CONTACTS_SLOT, company_contacts)
        .with_block(APPLICATION_INTERVIEWS_SLOT, application_interviews)
}

// ============================================================================
// Status Picker
// ============================================================================

fn status_picker(slot: FieldSlot) -> Element {
    let options = slot.kind.options().to_vec();
    let key = selected_key(&slot.value);

    if !slot.editing {
        let label = options
            .iter()
            .find(|o| o.key() == key)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| "-".to_string());
        let color = status_color(slot.value.as_str().unwrap_or_default());
        return rsx! {
            span {
                class: "inline-block px-2.5 py-0.5 rounded-full text-xs font-medium {color}",
                "{label}"
            }
        };
    }

    let on_change = slot.on_change;
    rsx! {
        ButtonGroup {
            value: key,
            choices: Choice::from_options(&options),
            disabled: slot.disabled,
            on_change: move |k: String| on_change.call(select_value(&options, &k)),
        }
    }
}

/// Badge colors of an application status
pub fn status_color(status: &str) -> &'static str {
    match status {
        "applied" => "bg-sky-500/20 text-sky-300",
        "interviewing" => "bg-amber-500/20 text-amber-300",
        "offer" => "bg-emerald-500/20 text-emerald-300",
        "rejected" => "bg-rose-500/20 text-rose-300",
        _ => "bg-slate-600/40 text-slate-300",
    }
}

// ============================================================================
// Related Records
// ============================================================================

fn company_contacts(slot: BlockSlot) -> Element {
    related_block(slot, EntityKind::Contact, "company")
}

fn application_interviews(slot: BlockSlot) -> Element {
    related_block(slot, EntityKind::Interview, "application")
}

fn related_block(slot: BlockSlot, kind: EntityKind, field: &'static str) -> Element {
    let Some(owner) = RecordId::of(&slot.data) else {
        return rsx! {};
    };
    rsx! {
        RelatedRecords { kind, field: field.to_string(), owner }
    }
}

#[derive(Props, Clone, PartialEq)]
struct RelatedRecordsProps {
    kind: EntityKind,
    field: String,
    owner: RecordId,
}

/// Records of `kind` whose `field` references `owner`
#[component]
fn RelatedRecords(props: RelatedRecordsProps) -> Element {
    let state = APP_STATE.read();
    let loaded = state.records.is_loaded(props.kind);
    let rows: Vec<(String, Value)> = related_records(&state.records, props.kind, &props.field, &props.owner)
        .into_iter()
        .filter_map(|r| {
            let data = r.as_object()?;
            Some((props.kind.title(data), r.clone()))
        })
        .collect();
    drop(state);

    let kind = props.kind;

    rsx! {
        div {
            class: "related-records pt-4 border-t border-slate-700",
            h3 {
                class: "text-sm font-semibold text-slate-400 uppercase tracking-wider mb-2",
                "{kind.plural()} ({rows.len()})"
            }

            if !loaded {
                p { class: "text-sm text-slate-500 italic", "Loading…" }
            } else if rows.is_empty() {
                p { class: "text-sm text-slate-500 italic", "None yet" }
            } else {
                ul {
                    class: "space-y-1",
                    for (i, (title, record)) in rows.into_iter().enumerate() {
                        li {
                            key: "{i}",
                            button {
                                r#type: "button",
                                class: "w-full text-left px-3 py-2 rounded-lg bg-slate-700/40 hover:bg-slate-700 transition-colors text-sm",
                                onclick: move |_| {
                                    let data = record.as_object().cloned().unwrap_or_default();
                                    APP_STATE.write().ui.show_dialog(Dialog::view(kind, data));
                                },
                                span { class: "mr-2", "{kind.icon()}" }
                                "{title}"
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
