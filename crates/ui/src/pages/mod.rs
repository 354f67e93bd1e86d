//! Page Components for Jobtrack
//!
//! This module contains the page/view components for the application.
//!
//! ## Available Pages
//!
//! - **EntityPage**: Searchable list of one record type (applications,
//!   companies, contacts, locations, interviews)
//!
//! The render slots the record modals use live in [`slots`].
//!

pub mod entity_page;
pub mod slots;

// Re-export page components for convenience
pub use entity_page::{EntityPage, load_page_data, load_records, table_rows};
pub use slots::{entity_slots, status_color};
