//! # Jobtrack Core
//!
//! Core types, value helpers and error handling for Jobtrack.
//!
//! This crate provides the foundational building blocks used by the
//! schema, client, engine and UI crates:
//!
//! - **Types**: Record identifiers, submodes, form data and field error maps
//! - **Values**: Blank-value normalisation used by required checks and dirty detection
//! - **Traits**: `Validatable` for schema consistency checks
//! - **Errors**: Unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult};
pub use traits::Validatable;
pub use types::{FieldErrors, FormData, RecordId, Submode};
pub use value::{
    PENDING_UPLOAD_KEY, changed_fields, forms_differ, is_missing, values_equivalent,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
