//! # Record List Page
//!
//! One page per record type: a searchable table of the cached records.
//!
//! On mount the page fetches its own list and the lists its form selects
//! draw their options from. Clicking a row opens the record in the entity
//! modal; "Add" opens an empty form.

use dioxus::prelude::*;
use jobtrack_client::Backend;
use jobtrack_core::RecordId;
use jobtrack_schema::{display_value, find_field};
use serde_json::Value;
use std::rc::Rc;

use crate::entities::EntityKind;
use crate::state::{APP_STATE, BackendHandle, Dialog, RecordCache, StatusLevel};

// ============================================================================
// Loading
// ============================================================================

/// Fetch the list of one record type into the cache
pub async fn load_records(backend: Rc<dyn Backend>, kind: EntityKind) {
    if APP_STATE.peek().records.is_loading(kind) {
        return;
    }
    APP_STATE.write().records.start_loading(kind);
    tracing::debug!("Loading {}", kind.endpoint());

    let result = backend.list(kind.endpoint(), &[]).await;

    let mut state = APP_STATE.write();
    match result {
        Ok(records) => {
            tracing::debug!("Loaded {} {}", records.len(), kind.endpoint());
            state.records.set_records(kind, records);
        }
        Err(e) if e.is_auth() => {
            tracing::warn!("Loading {} rejected: {}", kind.endpoint(), e);
            state.expire_session(e.user_message());
        }
        Err(e) => {
            tracing::error!("Loading {} failed: {}", kind.endpoint(), e);
            state.records.stop_loading(kind);
            state.ui.set_status(
                format!("Could not load {}: {}", kind.plural().to_lowercase(), e.user_message()),
                StatusLevel::Error,
            );
        }
    }
}

/// Fetch a type and every type its form looks up
pub fn load_page_data(backend: &Rc<dyn Backend>, kind: EntityKind) {
    for k in std::iter::once(kind).chain(kind.lookups().iter().copied()) {
        spawn(load_records(backend.clone(), k));
    }
}

// ============================================================================
// Entity Page Component
// ============================================================================

#[derive(Props, Clone, PartialEq)]
pub struct EntityPageProps {
    pub kind: EntityKind,
}

/// List page of one record type
#[component]
pub fn EntityPage(props: EntityPageProps) -> Element {
    let kind = props.kind;
    let backend = use_context::<BackendHandle>().get();
    let mut search_query = use_signal(String::new);

    use_hook({
        let backend = backend.clone();
        move || load_page_data(&backend, kind)
    });

    // Read global state
    let state = APP_STATE.read();
    let loading = state.records.is_loading(kind);
    let rows = table_rows(kind, &state.records, &search_query.read());
    let total = state.records.records(kind).len();
    drop(state);

    let columns = kind.columns();

    rsx! {
        div {
            class: "entity-page h-full flex flex-col",

            // Toolbar
            div {
                class: "flex items-center gap-4 px-6 py-4 border-b border-slate-700",

                span { class: "text-2xl", "{kind.icon()}" }
                h1 { class: "text-xl font-bold", "{kind.plural()}" }
                span { class: "text-sm text-slate-400", "{total}" }

                div { class: "flex-1" }

                input {
                    class: "w-64 px-3 py-1.5 bg-slate-800 border border-slate-700 rounded-lg text-sm focus:outline-none focus:ring-2 focus:ring-indigo-500/30",
                    r#type: "search",
                    placeholder: "Search…",
                    value: "{search_query}",
                    oninput: move |e| search_query.set(e.value()),
                }

                button {
                    class: "px-3 py-1.5 text-sm bg-slate-700 hover:bg-slate-600 rounded-lg transition-colors",
                    disabled: loading,
                    title: "Reload",
                    onclick: {
                        let backend = backend.clone();
                        move |_| load_page_data(&backend, kind)
                    },
                    if loading { "Loading…" } else { "↻ Refresh" }
                }

                button {
                    class: "px-3 py-1.5 text-sm bg-indigo-600 hover:bg-indigo-700 rounded-lg transition-colors",
                    onclick: move |_| APP_STATE.write().ui.show_dialog(Dialog::add(kind)),
                    "+ Add {kind.label().to_lowercase()}"
                }
            }

            // Table
            div {
                class: "flex-1 overflow-auto px-6 py-4",

                if rows.is_empty() {
                    div {
                        class: "flex flex-col items-center justify-center h-64 text-slate-500",
                        span { class: "text-4xl mb-3", "{kind.icon()}" }
                        p {
                            if loading {
                                "Loading…"
                            } else if total > 0 {
                                "Nothing matches your search"
                            } else {
                                "No {kind.plural().to_lowercase()} yet"
                            }
                        }
                    }
                } else {
                    table {
                        class: "w-full text-sm",
                        thead {
                            tr {
                                for (key, header) in columns.iter() {
                                    th {
                                        key: "{key}",
                                        class: "text-left px-3 py-2 text-xs font-medium uppercase tracking-wide text-slate-400 border-b border-slate-700",
                                        "{header}"
                                    }
                                }
                            }
                        }
                        tbody {
                            for row in rows {
                                tr {
                                    key: "{row.key}",
                                    class: "cursor-pointer hover:bg-slate-800 transition-colors",
                                    onclick: {
                                        let record = row.record.clone();
                                        move |_| {
                                            let data = record.as_object().cloned().unwrap_or_default();
                                            APP_STATE.write().ui.show_dialog(Dialog::view(kind, data));
                                        }
                                    },
                                    for (i, cell) in row.cells.iter().enumerate() {
                                        td {
                                            key: "{i}",
                                            class: "px-3 py-2 border-b border-slate-800 truncate max-w-xs",
                                            "{cell}"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Table Rows
// ============================================================================

/// One rendered table row
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub key: String,
    pub cells: Vec<String>,
    pub record: Value,
}

/// Rows of the list table, formatted like the detail view and filtered
/// by a case-insensitive search over the formatted cells
pub fn table_rows(kind: EntityKind, cache: &RecordCache, query: &str) -> Vec<TableRow> {
    let form = kind.form(cache);
    let query = query.trim().to_lowercase();

    cache
        .records(kind)
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let cells = kind
                .columns()
                .iter()
                .map(|(key, _)| match find_field(&form, key) {
                    Some(field) => display_value(field, record.get(*key)).to_text(),
                    None => jobtrack_core::value::value_to_text(record.get(*key)),
                })
                .collect();
            let key = record
                .get("id")
                .and_then(RecordId::from_value)
                .map(|id| id.to_string())
                .unwrap_or_else(|| format!("row-{}", index));
            TableRow {
                key,
                cells,
                record: record.clone(),
            }
        })
        .filter(|row| query.is_empty() || row.cells.iter().any(|c| c.to_lowercase().contains(&query)))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn cache() -> RecordCache {
        let mut cache = RecordCache::new();
        cache.set_records(
            EntityKind::Company,
            vec![json!({"id": 1, "name": "Acme"}), json!({"id": 2, "name": "Globex"})],
        );
        cache.set_records(
            EntityKind::Application,
            vec![
                json!({"id": 10, "role": "Backend Engineer", "company": 1, "status": "offer"}),
                json!({"id": 11, "role": "SRE", "company": 2, "status": "applied"}),
            ],
        );
        cache
    }

    #[test]
    fn test_rows_show_option_labels() {
        let rows = table_rows(EntityKind::Application, &cache(), "");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "10");
        assert_eq!(rows[0].cells[0], "Backend Engineer");
        assert_eq!(rows[0].cells[1], "Acme");
        assert_eq!(rows[0].cells[2], "Offer");
    }

    #[test]
    fn test_search_filters_rows() {
        let rows = table_rows(EntityKind::Application, &cache(), "globex");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[0], "SRE");

        assert!(table_rows(EntityKind::Application, &cache(), "nothing").is_empty());
    }

    #[test]
    fn test_rows_without_id_get_positional_keys() {
        let mut cache = RecordCache::new();
        cache.set_records(EntityKind::Location, vec![json!({"city": "Berlin"})]);
        let rows = table_rows(EntityKind::Location, &cache, "");
        assert_eq!(rows[0].key, "row-0");
    }
}
