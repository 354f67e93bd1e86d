//! # Entity Modal
//!
//! Detail view and form for one record, driven by a [`ModalSession`].
//!
//! ## Features
//!
//! - View, add and edit submodes with a dirty-checking cancel/close
//! - Tabs when the record type configures more than one scope
//! - Submission and delete run as spawned jobs; stale results are dropped
//! - Authentication failures end the session for the whole app
//!

use dioxus::prelude::*;
use jobtrack_core::{EngineError, FormData, RecordId, Submode};
use jobtrack_engine::{BannerKind, DiscardAction, DiscardOutcome, FormScope, ModalSession, Phase, SubmitEvent};
use serde_json::Value;
use std::rc::Rc;

use super::confirm_dialog::{ConfirmDialog, delete_consequences};
use crate::components::field_widget::RenderSlots;
use crate::components::layout::{FormContext, render_form, render_view};
use crate::entities::EntityKind;
use crate::state::{APP_STATE, BackendHandle, StatusLevel};

// ============================================================================
// Component Props
// ============================================================================

#[derive(Props, Clone, PartialEq)]
pub struct EntityModalProps {
    /// Record type
    pub kind: EntityKind,

    /// Record to show; None opens an empty form
    #[props(default)]
    pub record: Option<FormData>,

    /// Submode the modal opens in
    pub submode: Submode,

    /// Field overrides and custom blocks
    #[props(default)]
    pub slots: RenderSlots,

    /// Called once the modal has closed
    #[props(default)]
    pub on_close: EventHandler<()>,
}

// ============================================================================
// Main Component
// ============================================================================

/// Modal showing, editing or creating one record
#[component]
pub fn EntityModal(props: EntityModalProps) -> Element {
    let backend = use_context::<BackendHandle>().get();
    let kind = props.kind;
    let on_close = props.on_close;

    let mut session = use_signal({
        let backend = backend.clone();
        let record = props.record.clone();
        let submode = props.submode;
        move || {
            let scopes = build_scopes(kind, record, submode, &backend);
            let mut session = ModalSession::new(backend, scopes);
            session.open_default();
            session
        }
    });
    let mut confirm_delete = use_signal(|| false);
    let mut deleting = use_signal(|| false);

    // Rebuild scopes when the cached lists change so select options and
    // related records stay current
    use_effect({
        let backend = backend.clone();
        let record = props.record.clone();
        let submode = props.submode;
        move || {
            let fresh = {
                let state = APP_STATE.read();
                let record = latest_record(kind, record.clone(), &state.records);
                kind.scopes(record, submode, &state.records, &backend)
            };
            session.write().set_scopes(fresh);
        }
    });

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    let close_if_done = move || {
        if !session.peek().is_open() {
            on_close.call(());
        }
    };

    let handle_close = move |_| {
        if session.write().request_close() == DiscardOutcome::Done {
            on_close.call(());
        }
    };

    let handle_edit = move |_| {
        if let Err(e) = session.write().edit() {
            tracing::warn!("Cannot start editing: {}", e);
        }
    };

    let handle_cancel = move |_| {
        match session.write().cancel_edit() {
            Ok(DiscardOutcome::Done) => {}
            Ok(DiscardOutcome::NeedsConfirmation) => tracing::debug!("Cancel needs confirmation"),
            Err(e) => tracing::warn!("Cannot cancel: {}", e),
        }
        close_if_done();
    };

    let handle_submit = move |_| {
        let job = match session.write().begin_submit() {
            Ok(job) => job,
            Err(e) => {
                tracing::debug!("Submit ignored: {}", e);
                return;
            }
        };
        let saved_kind = session
            .peek()
            .scope()
            .and_then(|scope| EntityKind::from_endpoint(&scope.endpoint))
            .unwrap_or(kind);

        spawn(async move {
            let completion = job.run().await;
            let event = session.write().complete_submit(completion);
            match event {
                Ok(SubmitEvent::Closed(entity)) => {
                    APP_STATE.write().record_saved(saved_kind, entity);
                    on_close.call(());
                }
                Ok(SubmitEvent::Saved(entity)) => APP_STATE.write().record_saved(saved_kind, entity),
                Ok(SubmitEvent::Invalid) => APP_STATE
                    .write()
                    .ui
                    .set_status("Please correct the highlighted fields", StatusLevel::Warning),
                Ok(SubmitEvent::Failed) | Ok(SubmitEvent::Stale) => {}
                Err(e) => report_error(e),
            }
        });
    };

    let handle_delete = move |_| {
        let job = match session.write().begin_delete() {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!("Cannot delete: {}", e);
                confirm_delete.set(false);
                return;
            }
        };
        deleting.set(true);

        spawn(async move {
            let completion = job.run().await;
            let result = session.write().complete_delete(completion);
            deleting.set(false);
            confirm_delete.set(false);
            match result {
                Ok(Some(id)) => {
                    APP_STATE.write().record_deleted(kind, &id);
                    on_close.call(());
                }
                Ok(None) => {}
                Err(e) => report_error(e),
            }
        });
    };

    let on_field_change = EventHandler::new(move |(name, value): (String, Value)| {
        if let Err(e) = session.write().set_field(&name, value) {
            tracing::debug!("Field change ignored: {}", e);
        }
    });

    // ------------------------------------------------------------------
    // Render
    // ------------------------------------------------------------------

    let s = session.read();
    if !s.is_open() {
        return rsx! {};
    }

    let phase = s.phase();
    let editing = s.is_editing();
    let submitting = s.is_submitting();
    let title = modal_title(kind, s.scope(), s.submode(), s.form_data());
    let banner = s.banner().cloned();
    let pending_discard = s.pending_discard();
    let can_delete = phase == Phase::Viewing && s.active_tab() == 0 && s.record_id().is_some();
    let tabs: Vec<(usize, String)> = s
        .scopes()
        .iter()
        .enumerate()
        .map(|(i, scope)| (i, scope.label.clone()))
        .collect();
    let active_tab = s.active_tab();

    let body = if editing {
        render_form(
            s.active_groups(),
            &FormContext {
                data: s.form_data(),
                errors: s.errors(),
                slots: &props.slots,
                disabled: submitting,
                on_change: on_field_change,
            },
        )
    } else {
        render_view(s.active_groups(), s.form_data(), &props.slots)
    };

    let (delete_item, delete_related) = if *confirm_delete.read() {
        let state = APP_STATE.read();
        (
            kind.title(s.form_data()),
            delete_consequences(kind, s.form_data(), &state.records),
        )
    } else {
        (String::new(), Vec::new())
    };
    drop(s);

    rsx! {
        div {
            class: "fixed inset-0 z-50 flex items-center justify-center",

            // Backdrop
            div {
                class: "absolute inset-0 bg-black/50",
                onclick: handle_close,
            }

            div {
                class: "entity-modal relative w-full max-w-3xl mx-4 bg-slate-800 rounded-xl shadow-xl border border-slate-700",
                onclick: move |e| e.stop_propagation(),

                // Header
                div {
                    class: "flex items-center gap-3 px-6 pt-6 pb-4 border-b border-slate-700",
                    span { class: "text-2xl", "{kind.icon()}" }
                    h2 { class: "flex-1 text-xl font-bold truncate", "{title}" }
                    button {
                        r#type: "button",
                        class: "p-1.5 rounded hover:bg-slate-700 text-slate-400 hover:text-white transition-colors",
                        title: "Close",
                        onclick: handle_close,
                        "✕"
                    }
                }

                // Tabs
                if tabs.len() > 1 {
                    div {
                        class: "flex gap-1 px-6 pt-3 border-b border-slate-700",
                        for (index, label) in tabs {
                            button {
                                key: "{index}",
                                r#type: "button",
                                class: "px-3 py-2 text-sm rounded-t-lg transition-colors",
                                class: if index == active_tab {
                                    "bg-slate-700 text-white"
                                } else {
                                    "text-slate-400 hover:text-white hover:bg-slate-700/50"
                                },
                                onclick: move |_| {
                                    if let Err(e) = session.write().change_tab_index(index) {
                                        tracing::warn!("Cannot switch tab: {}", e);
                                    }
                                },
                                "{label}"
                            }
                        }
                    }
                }

                // Banner
                if let Some(banner) = banner {
                    div {
                        class: "mx-6 mt-4 p-3 bg-red-500/20 border border-red-500/50 rounded-lg",
                        p {
                            class: "text-sm font-medium text-red-300",
                            "{banner_heading(banner.kind)}"
                        }
                        p { class: "text-sm text-red-200", "{banner.message}" }
                    }
                }

                // Body
                div {
                    class: "px-6 py-5 max-h-[65vh] overflow-y-auto",
                    {body}
                }

                // Footer
                div {
                    class: "flex items-center gap-3 px-6 py-4 border-t border-slate-700",

                    if can_delete {
                        button {
                            r#type: "button",
                            class: "px-4 py-2 text-red-300 hover:bg-red-500/20 rounded-lg transition-colors",
                            onclick: move |_| confirm_delete.set(true),
                            "🗑️ Delete"
                        }
                    }

                    div { class: "flex-1" }

                    if editing {
                        button {
                            r#type: "button",
                            class: "px-4 py-2 bg-slate-700 hover:bg-slate-600 rounded-lg transition-colors",
                            disabled: submitting,
                            onclick: handle_cancel,
                            "Cancel"
                        }
                        button {
                            r#type: "button",
                            class: "px-4 py-2 bg-indigo-600 hover:bg-indigo-700 disabled:bg-indigo-600/50 disabled:cursor-not-allowed rounded-lg transition-colors flex items-center gap-2",
                            disabled: submitting,
                            onclick: handle_submit,
                            if submitting {
                                span { class: "animate-spin", "⏳" }
                                "Saving..."
                            } else {
                                "Save"
                            }
                        }
                    } else {
                        button {
                            r#type: "button",
                            class: "px-4 py-2 bg-slate-700 hover:bg-slate-600 rounded-lg transition-colors",
                            onclick: handle_close,
                            "Close"
                        }
                        button {
                            r#type: "button",
                            class: "px-4 py-2 bg-indigo-600 hover:bg-indigo-700 rounded-lg transition-colors",
                            onclick: handle_edit,
                            "✏️ Edit"
                        }
                    }
                }

                // Discard confirmation
                if let Some(action) = pending_discard {
                    ConfirmDialog {
                        title: "Discard changes?".to_string(),
                        message: discard_message(action),
                        confirm_label: "Discard".to_string(),
                        cancel_label: "Keep editing".to_string(),
                        on_confirm: move |_| {
                            session.write().confirm_discard();
                            close_if_done();
                        },
                        on_cancel: move |_| session.write().keep_editing(),
                    }
                }

                // Delete confirmation
                if *confirm_delete.read() {
                    ConfirmDialog {
                        title: format!("Delete {}", kind.label()),
                        message: "Are you sure you want to delete this record? This action cannot be undone.".to_string(),
                        item_name: Some(delete_item),
                        related: delete_related,
                        confirm_label: "🗑️ Delete".to_string(),
                        danger: true,
                        busy: *deleting.read(),
                        on_confirm: handle_delete,
                        on_cancel: move |_| confirm_delete.set(false),
                    }
                }
            }
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn build_scopes(
    kind: EntityKind,
    record: Option<FormData>,
    submode: Submode,
    backend: &Rc<dyn jobtrack_client::Backend>,
) -> Vec<FormScope> {
    let state = APP_STATE.read();
    let record = latest_record(kind, record, &state.records);
    kind.scopes(record, submode, &state.records, backend)
}

/// The cached copy of a record when there is one, else the given payload
fn latest_record(
    kind: EntityKind,
    record: Option<FormData>,
    cache: &crate::state::RecordCache,
) -> Option<FormData> {
    let id = record.as_ref().and_then(RecordId::of);
    match id.and_then(|id| cache.find(kind, &id)) {
        Some(cached) => cached.as_object().cloned().or(record),
        None => record,
    }
}

/// Heading of the modal for the active tab
fn modal_title(kind: EntityKind, scope: Option<&FormScope>, submode: Submode, data: &FormData) -> String {
    let tab_kind = scope
        .and_then(|s| EntityKind::from_endpoint(&s.endpoint))
        .unwrap_or(kind);
    match submode {
        Submode::Add => format!("New {}", tab_kind.label().to_lowercase()),
        Submode::Edit | Submode::View => tab_kind.title(data),
    }
}

fn banner_heading(kind: BannerKind) -> &'static str {
    match kind {
        BannerKind::Submission => "Could not save",
        BannerKind::FileProcessing => "Could not process attachments",
        BannerKind::Delete => "Could not delete",
    }
}

fn discard_message(action: DiscardAction) -> String {
    match action {
        DiscardAction::CancelEdit => "Your unsaved changes will be lost.".to_string(),
        DiscardAction::Close => "Closing now will lose your unsaved changes.".to_string(),
    }
}

/// Surface an error that escaped the session
fn report_error(err: EngineError) {
    if err.is_auth() {
        tracing::warn!("Session expired: {}", err);
        APP_STATE.write().expire_session(err.user_message());
    } else {
        tracing::error!("{}", err);
        APP_STATE.write().ui.set_status(err.user_message(), StatusLevel::Error);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RecordCache;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn form(value: Value) -> FormData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_latest_record_prefers_cache() {
        let mut cache = RecordCache::new();
        cache.set_records(EntityKind::Company, vec![json!({"id": 1, "name": "Acme Corp"})]);

        let stale = form(json!({"id": 1, "name": "Acme"}));
        let latest = latest_record(EntityKind::Company, Some(stale), &cache);
        assert_eq!(latest, Some(form(json!({"id": 1, "name": "Acme Corp"}))));
    }

    #[test]
    fn test_latest_record_without_id() {
        let cache = RecordCache::new();
        assert_eq!(latest_record(EntityKind::Company, None, &cache), None);

        let fresh = form(json!({"name": "Initech"}));
        assert_eq!(
            latest_record(EntityKind::Company, Some(fresh.clone()), &cache),
            Some(fresh)
        );
    }

    #[test]
    fn test_modal_title() {
        let data = form(json!({"id": 3, "name": "Acme"}));
        assert_eq!(modal_title(EntityKind::Company, None, Submode::View, &data), "Acme");
        assert_eq!(
            modal_title(EntityKind::Company, None, Submode::Add, &FormData::new()),
            "New company"
        );

        let contact = FormScope::new("contacts", "contacts");
        assert_eq!(
            modal_title(EntityKind::Company, Some(&contact), Submode::Add, &FormData::new()),
            "New contact"
        );
    }

    #[test]
    fn test_banner_heading() {
        assert_eq!(banner_heading(BannerKind::FileProcessing), "Could not process attachments");
    }
}
