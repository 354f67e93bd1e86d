//! # Jobtrack Schema
//!
//! Declarative description of entity forms and detail views.
//!
//! ## Core Concepts
//!
//! - **Field Descriptor**: One editable/displayable attribute (name, label, kind, rules)
//! - **Field Group**: Arranges descriptors into single fields, rows of up to four, or custom blocks
//! - **Display Value**: Read-only presentation of a field value in the detail view
//! - **Validation Pipeline**: Required, per-field and whole-entity checks producing a field error map
//!

// Module declarations
pub mod display;
pub mod field;
pub mod layout;
pub mod rules;
pub mod validation;

// Re-export commonly used types at crate root
pub use display::{DisplayValue, display_value};
pub use field::{FieldDescriptor, FieldKind, SelectOption, TableColumn, option_for_key, option_key};
pub use layout::{
    FieldGroup, LayoutRow, MAX_COLUMNS, check_unique_names, file_field_names, find_field,
    flatten_fields, layout_rows, validate_groups,
};
pub use rules::Rule;
pub use validation::{EntityValidator, FieldCheck, FieldValidator, ValidationPipeline, validate_form};

// Re-export core types that are commonly used with schemas
pub use jobtrack_core::{EngineError, EngineResult, FieldErrors, FormData};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for building forms
pub mod prelude {
    pub use crate::{
        // Validation
        EntityValidator,
        FieldCheck,
        // Descriptors
        FieldDescriptor,
        FieldGroup,
        FieldKind,
        FieldValidator,
        Rule,
        SelectOption,
        TableColumn,
    };
}
