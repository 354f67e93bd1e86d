//! # UI Components
//!
//! Reusable Dioxus components for the Jobtrack desktop app.
//!
//! - **Inputs**: One styled input per field kind
//! - **Field Widget**: Descriptor-driven input and read-only display, render slots
//! - **Layout**: Rows of one to four fields for forms and detail views
//! - **Dialogs**: The entity modal and confirmation prompts
//!
//! ## Component Hierarchy
//!
//! ```text
//! EntityModal
//! ├── Tabs
//! ├── render_form / render_view
//! │   ├── FormField → FieldFrame → FieldWidget → inputs
//! │   ├── FieldDisplay
//! │   └── custom blocks (render slots)
//! └── ConfirmDialog (discard / delete)
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod dialogs;
pub mod field_widget;
pub mod inputs;
pub mod layout;

// ============================================================================
// Re-exports
// ============================================================================

pub use field_widget::{
    BlockRenderer, BlockSlot, FieldDisplay, FieldRenderer, FieldSlot, FieldWidget, FormField,
    RenderSlots,
};
pub use inputs::{
    ButtonGroup, Checkbox, Choice, DateTimeInput, FieldFrame, FileInput, MultiSelect, RatingInput,
    SalaryInput, Select, TableInput, TextArea, TextInput,
};
pub use layout::{FormContext, grid_class, render_form, render_view};

pub use dialogs::{ConfirmDialog, EntityModal};
