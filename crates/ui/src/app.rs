//! Main Application Component for Jobtrack
//!
//! This module contains the root Dioxus component that renders the entire application.
//! It provides the main layout structure including toolbar, sidebar, content area,
//! status bar and the dialog overlay.

use anyhow::Context;
use dioxus::prelude::*;
use jobtrack_client::{ApiClient, Backend, ClientConfig, InMemoryBackend};
use std::rc::Rc;

use crate::components::dialogs::EntityModal;
use crate::entities::EntityKind;
use crate::pages::{EntityPage, entity_slots};
use crate::state::{APP_STATE, BackendHandle, Dialog, Page, StatusLevel};

// ============================================================================
// Backend
// ============================================================================

/// Build the HTTP backend from the client configuration
pub fn connect_backend() -> anyhow::Result<(Rc<dyn Backend>, String)> {
    let config = ClientConfig::load().context("loading client configuration")?;
    let client = ApiClient::new(&config).context("building HTTP client")?;
    tracing::info!("Using backend at {}", config.base_url);
    Ok((Rc::new(client), config.base_url))
}

// ============================================================================
// Main App Component
// ============================================================================

/// Root application component
#[component]
pub fn App() -> Element {
    let backend = use_hook(|| match connect_backend() {
        Ok((backend, url)) => {
            APP_STATE.write().api_url = url;
            BackendHandle::new(backend)
        }
        Err(e) => {
            tracing::error!("Backend unavailable: {:#}", e);
            APP_STATE
                .write()
                .ui
                .set_status(format!("Offline: {:#}", e), StatusLevel::Error);
            BackendHandle::new(Rc::new(InMemoryBackend::new()))
        }
    });
    use_context_provider(|| backend);

    use_effect(|| {
        tracing::info!("Jobtrack UI initialized");
    });

    rsx! {
        div {
            class: "app-container h-screen w-screen flex flex-col bg-slate-900 text-slate-100 overflow-hidden",

            // Top Toolbar
            Toolbar {}

            // Main content area with sidebar
            div {
                class: "flex flex-1 overflow-hidden",

                // Left Sidebar (navigation)
                Sidebar {}

                // Main Content Area
                MainContent {}
            }

            // Status Bar
            StatusBar {}

            // Dialog overlay (if active)
            DialogOverlay {}
        }
    }
}

// ============================================================================
// Toolbar Component
// ============================================================================

/// Top toolbar with quick-add actions
#[component]
fn Toolbar() -> Element {
    let state = APP_STATE.read();
    let session_expired = state.session_expired;
    drop(state);

    rsx! {
        header {
            class: "toolbar h-12 bg-slate-800 border-b border-slate-700 flex items-center px-4 gap-2 shrink-0",

            // App Logo/Title
            div {
                class: "flex items-center gap-2 mr-4",
                span { class: "text-xl", "📨" }
                span { class: "font-semibold text-sm hidden sm:inline", "Jobtrack" }
            }

            // Quick add
            div {
                class: "flex items-center gap-1",

                ToolbarButton {
                    icon: "📨",
                    label: "New application",
                    disabled: session_expired,
                    onclick: move |_| {
                        APP_STATE.write().ui.show_dialog(Dialog::add(EntityKind::Application));
                    }
                }

                ToolbarButton {
                    icon: "🗓️",
                    label: "New interview",
                    disabled: session_expired,
                    onclick: move |_| {
                        APP_STATE.write().ui.show_dialog(Dialog::add(EntityKind::Interview));
                    }
                }
            }

            // Spacer
            div { class: "flex-1" }

            if session_expired {
                div {
                    class: "flex items-center gap-2 text-sm text-red-400",
                    span { "🔒" }
                    span { "Session expired; update the API token and restart" }
                }
            }

            // Spacer
            div { class: "flex-1" }

            // View Actions
            div {
                class: "flex items-center gap-1",

                ToolbarButton {
                    icon: "🌙",
                    label: "Theme",
                    onclick: move |_| {
                        APP_STATE.write().ui.toggle_dark_mode();
                    }
                }

                ToolbarButton {
                    icon: "⚙️",
                    label: "Settings",
                    onclick: move |_| {
                        APP_STATE.write().ui.navigate(Page::Settings);
                    }
                }

                ToolbarButton {
                    icon: "ℹ️",
                    label: "About",
                    onclick: move |_| {
                        APP_STATE.write().ui.show_dialog(Dialog::About);
                    }
                }
            }
        }
    }
}

/// Toolbar button component
#[component]
fn ToolbarButton(
    icon: &'static str,
    label: &'static str,
    #[props(default = false)] disabled: bool,
    onclick: EventHandler<MouseEvent>,
) -> Element {
    let base_class = "px-2 py-1 rounded text-sm flex items-center gap-1 transition-colors";
    let state_class = if disabled {
        "opacity-50 cursor-not-allowed"
    } else {
        "hover:bg-slate-700 cursor-pointer"
    };

    rsx! {
        button {
            class: "{base_class} {state_class}",
            disabled: disabled,
            title: "{label}",
            onclick: move |e| {
                if !disabled {
                    onclick.call(e);
                }
            },
            span { "{icon}" }
            span { class: "hidden lg:inline", "{label}" }
        }
    }
}

// ============================================================================
// Sidebar Component
// ============================================================================

/// Left sidebar with navigation
#[component]
fn Sidebar() -> Element {
    let state = APP_STATE.read();
    let collapsed = state.ui.sidebar_collapsed;
    let current_page = state.ui.active_page;
    drop(state);

    rsx! {
        aside {
            class: "sidebar flex flex-col shrink-0 transition-all duration-200",
            style: if collapsed { "width: 60px;" } else { "width: 220px;" },

            // Header with toggle button
            div {
                class: "h-12 flex items-center justify-between px-3 border-b border-slate-700",

                if !collapsed {
                    span {
                        class: "text-sm font-semibold text-slate-300",
                        "Navigation"
                    }
                }

                button {
                    class: "w-8 h-8 flex items-center justify-center rounded hover:bg-slate-700 text-slate-400 hover:text-slate-200 transition-colors",
                    title: if collapsed { "Expand sidebar" } else { "Collapse sidebar" },
                    onclick: move |_| {
                        APP_STATE.write().ui.toggle_sidebar();
                    },
                    if collapsed { "☰" } else { "✕" }
                }
            }

            // Navigation items
            nav {
                class: "flex-1 py-4 overflow-y-auto",

                for page in Page::NAVIGATION {
                    SidebarItem {
                        key: "{page.display_name()}",
                        page,
                        current: current_page,
                        collapsed,
                    }
                }
            }

            // Settings at bottom
            div {
                class: "border-t border-slate-700 py-3",
                SidebarItem {
                    page: Page::Settings,
                    current: current_page,
                    collapsed,
                }
            }
        }
    }
}

/// Sidebar navigation item
#[component]
fn SidebarItem(page: Page, current: Page, collapsed: bool) -> Element {
    let is_active = page == current;
    let icon = page.icon();
    let name = page.display_name();

    let bg_class = if is_active {
        "background-color: rgb(79 70 229);"
    } else {
        "background-color: transparent;"
    };

    let text_color = if is_active {
        "color: white;"
    } else {
        "color: rgb(203 213 225);"
    };

    if collapsed {
        rsx! {
            button {
                class: if is_active { "" } else { "hover:bg-slate-700" },
                style: "display: flex; align-items: center; justify-content: center; width: 44px; height: 44px; margin: 4px auto; border-radius: 8px; cursor: pointer; border: none; transition: background-color 0.15s; {bg_class} {text_color}",
                title: "{name}",
                onclick: move |_| {
                    APP_STATE.write().ui.navigate(page);
                },
                span {
                    style: "font-size: 22px; line-height: 1;",
                    "{icon}"
                }
            }
        }
    } else {
        rsx! {
            button {
                class: if is_active { "" } else { "hover:bg-slate-700" },
                style: "display: flex; align-items: center; gap: 12px; padding: 10px 16px; margin: 2px 8px; border-radius: 8px; cursor: pointer; border: none; width: calc(100% - 16px); text-align: left; transition: background-color 0.15s; {bg_class} {text_color}",
                title: "{name}",
                onclick: move |_| {
                    APP_STATE.write().ui.navigate(page);
                },
                span {
                    style: "font-size: 20px; line-height: 1; flex-shrink: 0;",
                    "{icon}"
                }
                span {
                    style: "font-size: 14px; font-weight: 500;",
                    "{name}"
                }
            }
        }
    }
}

// ============================================================================
// Main Content Component
// ============================================================================

/// Main content area that renders the active page
#[component]
fn MainContent() -> Element {
    let current_page = APP_STATE.read().ui.active_page;

    rsx! {
        main {
            class: "flex-1 overflow-auto bg-slate-900",

            match current_page {
                Page::Applications => rsx! { EntityPage { kind: EntityKind::Application } },
                Page::Companies => rsx! { EntityPage { kind: EntityKind::Company } },
                Page::Contacts => rsx! { EntityPage { kind: EntityKind::Contact } },
                Page::Locations => rsx! { EntityPage { kind: EntityKind::Location } },
                Page::Interviews => rsx! { EntityPage { kind: EntityKind::Interview } },
                Page::Settings => rsx! { SettingsPage {} },
            }
        }
    }
}

// ============================================================================
// Settings Page
// ============================================================================

/// Settings page
#[component]
fn SettingsPage() -> Element {
    let state = APP_STATE.read();
    let dark_mode = state.ui.dark_mode;
    let api_url = state.api_url.clone();
    let session_expired = state.session_expired;
    drop(state);

    rsx! {
        div {
            class: "p-8 max-w-2xl",
            h2 { class: "text-2xl font-bold mb-6", "Settings" }

            div {
                class: "space-y-4",

                // Backend
                div {
                    class: "p-4 bg-slate-800 rounded-lg",
                    h3 { class: "font-medium mb-1", "Backend" }
                    p {
                        class: "text-sm font-mono text-slate-300",
                        if api_url.is_empty() { "Not connected" } else { "{api_url}" }
                    }
                    p {
                        class: "text-xs text-slate-500 mt-2",
                        "Set JOBTRACK_API_URL, JOBTRACK_API_TOKEN and JOBTRACK_TIMEOUT_SECS, or edit jobtrack.toml, then restart."
                    }
                    if session_expired {
                        p { class: "text-sm text-red-400 mt-2", "The backend rejected the configured token." }
                    }
                }

                // Dark mode toggle
                div {
                    class: "flex items-center justify-between p-4 bg-slate-800 rounded-lg",
                    div {
                        h3 { class: "font-medium", "Dark Mode" }
                        p { class: "text-sm text-slate-400", "Use dark theme for the application" }
                    }
                    button {
                        class: "px-4 py-2 rounded transition-colors",
                        class: if dark_mode { "bg-indigo-600" } else { "bg-slate-600" },
                        onclick: move |_| {
                            APP_STATE.write().ui.toggle_dark_mode();
                        },
                        if dark_mode { "On" } else { "Off" }
                    }
                }

                // About section
                div {
                    class: "p-4 bg-slate-800 rounded-lg",
                    h3 { class: "font-medium mb-2", "About" }
                    p { class: "text-sm text-slate-400", "{crate::NAME} v{crate::VERSION}" }
                }
            }
        }
    }
}

// ============================================================================
// Status Bar Component
// ============================================================================

/// Bottom status bar
#[component]
fn StatusBar() -> Element {
    let state = APP_STATE.read();
    let status = state.ui.status_message.clone();
    let page = state.ui.active_page;
    let record_count = page
        .entity()
        .map(|kind| state.records.records(kind).len());
    drop(state);

    rsx! {
        footer {
            class: "status-bar h-6 bg-slate-800 border-t border-slate-700 flex items-center px-4 text-xs text-slate-400 shrink-0",

            // Status message
            if let Some(msg) = status {
                span {
                    class: match msg.level {
                        StatusLevel::Info => "text-slate-400",
                        StatusLevel::Success => "text-green-400",
                        StatusLevel::Warning => "text-amber-400",
                        StatusLevel::Error => "text-red-400",
                    },
                    "{msg.text}"
                }
                button {
                    class: "ml-2 text-slate-500 hover:text-slate-300",
                    title: "Dismiss",
                    onclick: move |_| APP_STATE.write().ui.clear_status(),
                    "✕"
                }
            } else {
                span { "Ready" }
            }

            // Spacer
            div { class: "flex-1" }

            if let Some(count) = record_count {
                span { "{page.display_name()}: {count}" }
            }
        }
    }
}

// ============================================================================
// Dialog Overlay Component
// ============================================================================

/// Modal dialog overlay
#[component]
fn DialogOverlay() -> Element {
    let state = APP_STATE.read();
    let dialog = state.ui.active_dialog.clone();
    drop(state);

    let Some(dialog) = dialog else {
        return rsx! {};
    };

    // The entity modal draws its own backdrop so closing goes through
    // its unsaved-changes check
    if let Dialog::Entity { kind, record, submode } = dialog {
        let key = modal_key(kind, record.as_ref(), submode);
        return rsx! {
            for key in std::iter::once(key) {
                EntityModal {
                    key: "{key}",
                    kind,
                    record: record.clone(),
                    submode,
                    slots: entity_slots(),
                    on_close: move |_| APP_STATE.write().ui.close_dialog(),
                }
            }
        };
    }

    rsx! {
        div {
            class: "fixed inset-0 z-50 flex items-center justify-center",

            // Backdrop
            div {
                class: "absolute inset-0 bg-black/50",
                onclick: move |_| {
                    APP_STATE.write().ui.close_dialog();
                }
            }

            // Dialog content
            div {
                class: "relative bg-slate-800 rounded-lg shadow-xl border border-slate-700 mx-4 max-w-lg w-full",
                onclick: move |e| e.stop_propagation(),

                match dialog {
                    Dialog::About => rsx! { AboutDialog {} },
                    Dialog::Error(ref msg) => rsx! { ErrorDialog { message: msg.clone() } },
                    Dialog::Entity { .. } => rsx! {},
                }
            }
        }
    }
}

/// Identity of an entity modal; a new key remounts the modal
fn modal_key(
    kind: EntityKind,
    record: Option<&jobtrack_core::FormData>,
    submode: jobtrack_core::Submode,
) -> String {
    let id = record
        .and_then(jobtrack_core::RecordId::of)
        .map(|id| id.to_string())
        .unwrap_or_else(|| "new".to_string());
    format!("{}-{}-{}", kind.endpoint(), id, submode)
}

/// About dialog
#[component]
fn AboutDialog() -> Element {
    rsx! {
        div {
            class: "p-6 text-center",

            p { class: "text-4xl mb-4", "📨" }
            h2 { class: "text-xl font-bold mb-2", "{crate::NAME}" }
            p { class: "text-slate-400 mb-4", "Version {crate::VERSION}" }
            p { class: "text-sm text-slate-500 mb-4", "Track applications, companies, contacts and interviews" }

            button {
                class: "px-4 py-2 bg-slate-700 hover:bg-slate-600 rounded transition-colors",
                onclick: move |_| {
                    APP_STATE.write().ui.close_dialog();
                },
                "Close"
            }
        }
    }
}

/// Error dialog
#[component]
fn ErrorDialog(message: String) -> Element {
    rsx! {
        div {
            class: "p-6",

            div {
                class: "flex items-start gap-3 mb-4",
                span { class: "text-2xl", "❌" }
                div {
                    h2 { class: "text-xl font-bold text-red-400", "Error" }
                    p { class: "text-slate-300 mt-1", "{message}" }
                }
            }

            div {
                class: "flex justify-end",
                button {
                    class: "px-4 py-2 bg-slate-700 hover:bg-slate-600 rounded transition-colors",
                    onclick: move |_| {
                        APP_STATE.write().ui.close_dialog();
                    },
                    "Close"
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use jobtrack_core::{FormData, Submode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_modal_key() {
        let record: FormData = json!({"id": 4}).as_object().cloned().unwrap_or_default();
        assert_eq!(
            modal_key(EntityKind::Company, Some(&record), Submode::View),
            format!("companies-4-{}", Submode::View)
        );
        assert_eq!(
            modal_key(EntityKind::Company, None, Submode::Add),
            format!("companies-new-{}", Submode::Add)
        );
    }

    #[test]
    fn test_modal_key_changes_with_record() {
        let a: FormData = json!({"id": 1}).as_object().cloned().unwrap_or_default();
        let b: FormData = json!({"id": 2}).as_object().cloned().unwrap_or_default();
        assert_ne!(
            modal_key(EntityKind::Contact, Some(&a), Submode::View),
            modal_key(EntityKind::Contact, Some(&b), Submode::View)
        );
    }
}
