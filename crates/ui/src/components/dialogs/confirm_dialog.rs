//! # Confirm Dialog Component
//!
//! Confirmation prompts shown on top of the entity modal.
//!
//! ## Features
//!
//! - Confirm deleting a record, listing the records that point at it
//! - Confirm discarding unsaved changes
//!

use dioxus::prelude::*;
use jobtrack_core::{FormData, RecordId};

use crate::entities::{EntityKind, related_records};
use crate::state::RecordCache;

// ============================================================================
// Component Props
// ============================================================================

#[derive(Props, Clone, PartialEq)]
pub struct ConfirmDialogProps {
    /// Heading
    pub title: String,

    /// Question shown under the heading
    pub message: String,

    /// Name of the affected record, if any
    #[props(default)]
    pub item_name: Option<String>,

    /// Records affected besides the item
    #[props(default)]
    pub related: Vec<String>,

    /// Label of the confirming button
    #[props(default = "Confirm".to_string())]
    pub confirm_label: String,

    /// Label of the cancelling button
    #[props(default = "Cancel".to_string())]
    pub cancel_label: String,

    /// Whether the action destroys data
    #[props(default = false)]
    pub danger: bool,

    /// Whether the action is running
    #[props(default = false)]
    pub busy: bool,

    /// Called when confirmed
    #[props(default)]
    pub on_confirm: EventHandler<()>,

    /// Called when cancelled
    #[props(default)]
    pub on_cancel: EventHandler<()>,
}

// ============================================================================
// Main Component
// ============================================================================

/// Confirmation prompt layered over its parent
#[component]
pub fn ConfirmDialog(props: ConfirmDialogProps) -> Element {
    let (icon_bg, title_color, confirm_class) = if props.danger {
        (
            "bg-red-500/20",
            "text-red-400",
            "bg-red-600 hover:bg-red-700 disabled:bg-red-600/50",
        )
    } else {
        (
            "bg-amber-500/20",
            "text-amber-300",
            "bg-indigo-600 hover:bg-indigo-700 disabled:bg-indigo-600/50",
        )
    };

    rsx! {
        div {
            class: "absolute inset-0 z-10 flex items-center justify-center bg-black/50 rounded-xl",
            onclick: move |e| e.stop_propagation(),

            div {
                class: "confirm-dialog w-full max-w-md p-6 bg-slate-800 border border-slate-700 rounded-xl shadow-2xl",

                // Header with warning icon
                div {
                    class: "flex items-start gap-4 mb-6",

                    div {
                        class: "flex-shrink-0 w-12 h-12 rounded-full {icon_bg} flex items-center justify-center",
                        span { class: "text-2xl", "⚠️" }
                    }

                    div {
                        class: "flex-1",
                        h2 {
                            class: "text-xl font-bold {title_color} mb-2",
                            "{props.title}"
                        }
                        p {
                            class: "text-slate-300",
                            "{props.message}"
                        }
                    }
                }

                // Item
                if let Some(item_name) = &props.item_name {
                    div {
                        class: "mb-4 p-3 bg-slate-700/50 rounded-lg border border-slate-600",
                        div {
                            class: "flex items-center gap-2",
                            span { class: "text-slate-400", "Item:" }
                            span { class: "font-medium text-white", "{item_name}" }
                        }
                    }
                }

                // Related records
                if !props.related.is_empty() {
                    div {
                        class: "mb-4 p-3 bg-amber-500/10 border border-amber-500/30 rounded-lg",
                        div {
                            class: "flex items-start gap-2",
                            span { class: "text-amber-400", "⚠" }
                            div {
                                class: "text-sm text-amber-300",
                                p { class: "font-medium mb-1", "Still pointing at it:" }
                                ul {
                                    class: "list-disc list-inside text-amber-200/80",
                                    for info in props.related.iter() {
                                        li { "{info}" }
                                    }
                                }
                            }
                        }
                    }
                }

                // Actions
                div {
                    class: "flex justify-end gap-3",

                    button {
                        r#type: "button",
                        class: "px-4 py-2 bg-slate-700 hover:bg-slate-600 rounded-lg transition-colors",
                        disabled: props.busy,
                        onclick: move |_| props.on_cancel.call(()),
                        "{props.cancel_label}"
                    }

                    button {
                        r#type: "button",
                        class: "px-4 py-2 {confirm_class} disabled:cursor-not-allowed rounded-lg transition-colors flex items-center gap-2",
                        disabled: props.busy,
                        onclick: move |_| props.on_confirm.call(()),

                        if props.busy {
                            span { class: "animate-spin", "⏳" }
                            "Working..."
                        } else {
                            "{props.confirm_label}"
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Records of other types that reference the record about to be deleted
pub fn delete_consequences(kind: EntityKind, data: &FormData, cache: &RecordCache) -> Vec<String> {
    let Some(id) = RecordId::of(data) else {
        return Vec::new();
    };

    let references: &[(EntityKind, &str)] = match kind {
        EntityKind::Company => &[
            (EntityKind::Contact, "company"),
            (EntityKind::Application, "company"),
        ],
        EntityKind::Application => &[(EntityKind::Interview, "application")],
        EntityKind::Location => &[(EntityKind::Company, "location")],
        EntityKind::Contact | EntityKind::Interview => &[],
    };

    references
        .iter()
        .filter_map(|(other, field)| {
            let count = related_records(cache, *other, field, &id).len();
            (count > 0).then(|| plural(count, other.label(), other.plural()))
        })
        .collect()
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {}", singular.to_lowercase())
    } else {
        format!("{} {}", count, plural.to_lowercase())
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

    fn form(value: serde_json::Value) -> FormData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_company_delete_lists_references() {
        let mut cache = RecordCache::new();
        cache.set_records(
            EntityKind::Contact,
            vec![
                json!({"id": 1, "company": 7}),
                json!({"id": 2, "company": 7}),
                json!({"id": 3, "company": 8}),
            ],
        );
        cache.set_records(EntityKind::Application, vec![json!({"id": 5, "company": 7})]);

        let related = delete_consequences(EntityKind::Company, &form(json!({"id": 7})), &cache);
        assert_eq!(related, vec!["2 contacts", "1 application"]);
    }

    #[test]
    fn test_unsaved_record_has_no_references() {
        let cache = RecordCache::new();
        assert!(delete_consequences(EntityKind::Company, &FormData::new(), &cache).is_empty());
    }

    #[test]
    fn test_contact_delete_has_no_references() {
        let mut cache = RecordCache::new();
        cache.set_records(EntityKind::Interview, vec![json!({"id": 1, "application": 3})]);
        let related = delete_consequences(EntityKind::Contact, &form(json!({"id": 3})), &cache);
        assert!(related.is_empty());
    }
}
