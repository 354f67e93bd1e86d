//! # Dialog Components
//!
//! Modal dialogs for the Jobtrack UI.
//!
//! ## Dialogs
//!
//! - **EntityModal**: View, add and edit one record
//! - **ConfirmDialog**: Confirmation for deletes and discarded edits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jobtrack_ui::components::dialogs::EntityModal;
//!
//! fn MyComponent() -> Element {
//!     rsx! {
//!         EntityModal { kind: EntityKind::Company, submode: Submode::Add }
//!     }
//! }
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod confirm_dialog;
pub mod entity_modal;

// ============================================================================
// Re-exports
// ============================================================================

pub use confirm_dialog::{ConfirmDialog, delete_consequences};
pub use entity_modal::EntityModal;
