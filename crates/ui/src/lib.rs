//! # Jobtrack UI
//!
//! Dioxus Desktop UI for Jobtrack.
//!
//! This crate turns the declarative record schemas into list pages and
//! entity modals backed by the REST backend.
//!
//! ## Features
//!
//! - One list page per record type with search
//! - Entity modal with view, add and edit submodes and tabs
//! - Attachment upload with de-duplication and download
//! - Render slots for custom field widgets and related-record blocks
//!

// ============================================================================
// Modules
// ============================================================================

pub mod app;
pub mod components;
pub mod entities;
pub mod file_ops;
pub mod pages;
pub mod state;

// ============================================================================
// Re-exports
// ============================================================================

// Re-export internal crates for convenience
pub use jobtrack_core;
pub use jobtrack_engine;
pub use jobtrack_schema;

// Re-export main components
pub use app::App;
pub use entities::EntityKind;
pub use file_ops::{pick_attachment, save_attachment};
pub use pages::EntityPage;
pub use state::{
    APP_STATE, AppState, BackendHandle, Dialog, Page, RecordCache, StatusLevel, StatusMessage,
    UiState,
};

// Re-export components
pub use components::{ConfirmDialog, EntityModal, FieldWidget, RenderSlots};

// ============================================================================
// Constants
// ============================================================================

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = "Jobtrack";

/// Application display title
pub const TITLE: &str = "Jobtrack - Job Application Tracker";

/// CSS styles for the application, included at build time
const STYLES: &str = include_str!("../../../assets/styles/main.css");

// ============================================================================
// Launch Function
// ============================================================================

/// Launch the Jobtrack desktop application
///
/// This is the main entry point for the Dioxus desktop app.
///
/// # Example
///
/// ```rust,ignore
/// fn main() {
///     jobtrack_ui::launch();
/// }
/// ```
pub fn launch() {
    tracing::info!("Starting {} v{}", NAME, VERSION);

    // Build custom head with embedded CSS
    let custom_head = format!(r#"<style type="text/css">{}</style>"#, STYLES);

    // Configure and launch Dioxus desktop app
    dioxus::LaunchBuilder::desktop()
        .with_cfg(
            dioxus::desktop::Config::new()
                .with_window(
                    dioxus::desktop::WindowBuilder::new()
                        .with_title(TITLE)
                        .with_resizable(true)
                        .with_inner_size(dioxus::desktop::LogicalSize::new(1280.0, 820.0))
                        .with_min_inner_size(dioxus::desktop::LogicalSize::new(800.0, 600.0)),
                )
                .with_menu(None) // Disable default menu, we use custom toolbar
                .with_custom_head(custom_head),
        )
        .launch(App);
}

/// Get the embedded CSS styles
pub fn get_styles() -> &'static str {
    STYLES
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "Jobtrack");
    }

    #[test]
    fn test_title() {
        assert!(TITLE.contains("Jobtrack"));
    }

    #[test]
    fn test_styles_loaded() {
        assert!(!get_styles().is_empty());
        assert!(STYLES.contains(".app-container"));
        assert!(STYLES.contains(".grid-cols-4"));
    }
}
