//! Application State Management for Jobtrack
//!
//! This module provides the global application state using Dioxus signals.
//! It holds the navigation and dialog state plus a cache of the record lists
//! fetched from the backend, which also feeds the select options of the
//! entity forms.

use dioxus::prelude::*;
use jobtrack_client::Backend;
use jobtrack_core::{FormData, RecordId, Submode};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::entities::EntityKind;

// ============================================================================
// Page Navigation
// ============================================================================

/// Available pages in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    /// Job applications
    #[default]
    Applications,
    /// Companies
    Companies,
    /// Contact people
    Contacts,
    /// Office locations
    Locations,
    /// Interviews
    Interviews,
    /// Settings page
    Settings,
}

impl Page {
    /// Pages listed in the sidebar, in order
    pub const NAVIGATION: [Page; 5] = [
        Page::Applications,
        Page::Companies,
        Page::Contacts,
        Page::Locations,
        Page::Interviews,
    ];

    /// Get the display name for the page
    pub fn display_name(&self) -> &'static str {
        match self.entity() {
            Some(kind) => kind.plural(),
            None => "Settings",
        }
    }

    /// Get the icon for the page
    pub fn icon(&self) -> &'static str {
        match self.entity() {
            Some(kind) => kind.icon(),
            None => "⚙️",
        }
    }

    /// Record type listed on this page
    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Page::Applications => Some(EntityKind::Application),
            Page::Companies => Some(EntityKind::Company),
            Page::Contacts => Some(EntityKind::Contact),
            Page::Locations => Some(EntityKind::Location),
            Page::Interviews => Some(EntityKind::Interview),
            Page::Settings => None,
        }
    }
}

// ============================================================================
// Record Cache
// ============================================================================

/// Record lists fetched from the backend, keyed by record type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordCache {
    lists: BTreeMap<EntityKind, Vec<Value>>,
    loading: BTreeSet<EntityKind>,
}

impl RecordCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached records of a type
    pub fn records(&self, kind: EntityKind) -> &[Value] {
        self.lists.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the list of a type has been fetched at least once
    pub fn is_loaded(&self, kind: EntityKind) -> bool {
        self.lists.contains_key(&kind)
    }

    /// Whether a fetch for this type is in flight
    pub fn is_loading(&self, kind: EntityKind) -> bool {
        self.loading.contains(&kind)
    }

    /// Mark a fetch as started
    pub fn start_loading(&mut self, kind: EntityKind) {
        self.loading.insert(kind);
    }

    /// Mark a fetch as finished without a result
    pub fn stop_loading(&mut self, kind: EntityKind) {
        self.loading.remove(&kind);
    }

    /// Replace the list of a type
    pub fn set_records(&mut self, kind: EntityKind, records: Vec<Value>) {
        self.loading.remove(&kind);
        self.lists.insert(kind, records);
    }

    /// Insert or replace a record by its `id`
    pub fn upsert(&mut self, kind: EntityKind, record: Value) {
        let id = record.get("id").and_then(RecordId::from_value);
        let list = self.lists.entry(kind).or_default();
        let existing = id.as_ref().and_then(|id| {
            list.iter()
                .position(|r| r.get("id").and_then(RecordId::from_value).as_ref() == Some(id))
        });
        match existing {
            Some(index) => list[index] = record,
            None => list.push(record),
        }
    }

    /// Drop a record by id
    pub fn remove(&mut self, kind: EntityKind, id: &RecordId) {
        if let Some(list) = self.lists.get_mut(&kind) {
            list.retain(|r| r.get("id").and_then(RecordId::from_value).as_ref() != Some(id));
        }
    }

    /// Find a record by id
    pub fn find(&self, kind: EntityKind, id: &RecordId) -> Option<&Value> {
        self.records(kind)
            .iter()
            .find(|r| r.get("id").and_then(RecordId::from_value).as_ref() == Some(id))
    }

    /// Forget everything, e.g. after the session expired
    pub fn clear(&mut self) {
        self.lists.clear();
        self.loading.clear();
    }
}

// ============================================================================
// UI State
// ============================================================================

/// UI-specific state (panels, dialogs, etc.)
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    /// Whether the sidebar is collapsed
    pub sidebar_collapsed: bool,
    /// Currently active page
    pub active_page: Page,
    /// Active dialog (if any)
    pub active_dialog: Option<Dialog>,
    /// Status bar message
    pub status_message: Option<StatusMessage>,
    /// Whether dark mode is enabled
    pub dark_mode: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_collapsed: false,
            active_page: Page::default(),
            active_dialog: None,
            status_message: None,
            dark_mode: true,
        }
    }
}

impl UiState {
    /// Create new UI state
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigate to a page
    pub fn navigate(&mut self, page: Page) {
        self.active_page = page;
    }

    /// Show a dialog
    pub fn show_dialog(&mut self, dialog: Dialog) {
        self.active_dialog = Some(dialog);
    }

    /// Close the current dialog
    pub fn close_dialog(&mut self) {
        self.active_dialog = None;
    }

    /// Set status message
    pub fn set_status(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status_message = Some(StatusMessage {
            text: message.into(),
            level,
        });
    }

    /// Clear status message
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Toggle sidebar
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    /// Toggle dark mode
    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }
}

/// Dialog types
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    /// Entity modal for one record
    Entity {
        kind: EntityKind,
        record: Option<FormData>,
        submode: Submode,
    },
    /// About dialog
    About,
    /// Error dialog
    Error(String),
}

impl Dialog {
    /// Detail view of an existing record
    pub fn view(kind: EntityKind, record: FormData) -> Self {
        Dialog::Entity {
            kind,
            record: Some(record),
            submode: Submode::View,
        }
    }

    /// Empty form for a new record
    pub fn add(kind: EntityKind) -> Self {
        Dialog::Entity {
            kind,
            record: None,
            submode: Submode::Add,
        }
    }
}

/// Status message for the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

/// Status message severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

// ============================================================================
// Application State
// ============================================================================

/// Main application state container
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// UI state
    pub ui: UiState,
    /// Record lists fetched from the backend
    pub records: RecordCache,
    /// Backend base URL, shown in the settings page
    pub api_url: String,
    /// Set when the backend rejected our credentials
    pub session_expired: bool,
}

impl AppState {
    /// Create new application state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a saved entity and report it
    pub fn record_saved(&mut self, kind: EntityKind, entity: Value) {
        let title = entity
            .as_object()
            .map(|data| kind.title(data))
            .unwrap_or_default();
        self.records.upsert(kind, entity);
        self.ui
            .set_status(format!("{} \"{}\" saved", kind.label(), title), StatusLevel::Success);
    }

    /// Drop a deleted entity and report it
    pub fn record_deleted(&mut self, kind: EntityKind, id: &RecordId) {
        self.records.remove(kind, id);
        self.ui
            .set_status(format!("{} deleted", kind.label()), StatusLevel::Success);
    }

    /// The backend rejected the credentials: drop cached data and dialogs
    pub fn expire_session(&mut self, message: impl Into<String>) {
        self.session_expired = true;
        self.records.clear();
        self.ui.close_dialog();
        self.ui.set_status(message, StatusLevel::Error);
    }

    /// Get the window title for the current state
    pub fn window_title(&self) -> String {
        format!("{} - Jobtrack", self.ui.active_page.display_name())
    }
}

// ============================================================================
// Global State Signal
// ============================================================================

/// Global application state signal
/// Use this in components to access and modify app state
pub static APP_STATE: GlobalSignal<AppState> = Signal::global(AppState::new);

/// Backend shared through the component context
#[derive(Clone)]
pub struct BackendHandle(Rc<dyn Backend>);

impl BackendHandle {
    pub fn new(backend: Rc<dyn Backend>) -> Self {
        Self(backend)
    }

    pub fn get(&self) -> Rc<dyn Backend> {
        self.0.clone()
    }
}

/// Hook to access the current page
pub fn use_current_page() -> Page {
    APP_STATE.read().ui.active_page
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
    fn test_page_display_name() {
        assert_eq!(Page::Applications.display_name(), "Applications");
        assert_eq!(Page::Settings.display_name(), "Settings");
    }

    #[test]
    fn test_page_entity() {
        assert_eq!(Page::Companies.entity(), Some(EntityKind::Company));
        assert_eq!(Page::Settings.entity(), None);
        assert!(Page::NAVIGATION.iter().all(|p| p.entity().is_some()));
    }

    #[test]
    fn test_ui_state_dialogs() {
        let mut ui = UiState::new();
        assert!(ui.active_dialog.is_none());

        ui.show_dialog(Dialog::add(EntityKind::Contact));
        assert_eq!(
            ui.active_dialog,
            Some(Dialog::Entity {
                kind: EntityKind::Contact,
                record: None,
                submode: Submode::Add,
            })
        );

        ui.close_dialog();
        assert!(ui.active_dialog.is_none());
    }

    #[test]
    fn test_cache_upsert_replaces_by_id() {
        let mut cache = RecordCache::new();
        cache.set_records(
            EntityKind::Company,
            vec![json!({"id": 1, "name": "Acme"}), json!({"id": 2, "name": "Globex"})],
        );

        cache.upsert(EntityKind::Company, json!({"id": 2, "name": "Globex Corp"}));
        cache.upsert(EntityKind::Company, json!({"id": 3, "name": "Initech"}));

        let names: Vec<_> = cache
            .records(EntityKind::Company)
            .iter()
            .map(|r| r["name"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(names, vec!["Acme", "Globex Corp", "Initech"]);
    }

    #[test]
    fn test_cache_remove_and_find() {
        let mut cache = RecordCache::new();
        cache.set_records(EntityKind::Location, vec![json!({"id": "a1", "city": "Berlin"})]);

        assert!(cache.find(EntityKind::Location, &"a1".into()).is_some());
        cache.remove(EntityKind::Location, &"a1".into());
        assert!(cache.records(EntityKind::Location).is_empty());
        assert!(cache.is_loaded(EntityKind::Location));
        assert!(!cache.is_loaded(EntityKind::Contact));
    }

    #[test]
    fn test_cache_loading_flags() {
        let mut cache = RecordCache::new();
        cache.start_loading(EntityKind::Company);
        assert!(cache.is_loading(EntityKind::Company));

        cache.set_records(EntityKind::Company, Vec::new());
        assert!(!cache.is_loading(EntityKind::Company));
    }

    #[test]
    fn test_record_saved_updates_status() {
        let mut state = AppState::new();
        state.record_saved(EntityKind::Company, json!({"id": 1, "name": "Acme"}));

        assert_eq!(state.records.records(EntityKind::Company).len(), 1);
        let status = state.ui.status_message.clone();
        assert_eq!(status.map(|s| s.level), Some(StatusLevel::Success));
    }

    #[test]
    fn test_expire_session_clears_cache() {
        let mut state = AppState::new();
        state.records.set_records(EntityKind::Company, vec![json!({"id": 1})]);
        state.ui.show_dialog(Dialog::About);

        state.expire_session("Session expired");

        assert!(state.session_expired);
        assert!(state.ui.active_dialog.is_none());
        assert!(!state.records.is_loaded(EntityKind::Company));
    }
}
