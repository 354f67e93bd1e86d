//! Field group layout
//!
//! Arranges descriptors into stacked single fields, rows of up to
//! [`MAX_COLUMNS`] columns, and caller-rendered custom blocks. Layout is
//! purely structural; groups are rebuilt by callers whenever their
//! options change.

use jobtrack_core::{EngineError, EngineResult, Validatable};
use std::collections::HashSet;

use crate::field::FieldDescriptor;

/// Maximum number of columns in one rendered row
pub const MAX_COLUMNS: usize = 4;

// ============================================================================
// FieldGroup
// ============================================================================

/// One entry of a form or view layout
#[derive(Debug, Clone)]
pub enum FieldGroup {
    /// A single full-width field
    Single(FieldDescriptor),
    /// Fields sharing one row
    Row(Vec<FieldDescriptor>),
    /// Caller-rendered content, optionally owning the fields it renders
    Custom {
        /// Content slot key resolved by the UI layer
        key: String,
        /// Fields rendered by the custom content (validated like the rest)
        fields: Vec<FieldDescriptor>,
    },
}

impl FieldGroup {
    /// Row of fields
    pub fn row(fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        FieldGroup::Row(fields.into_iter().collect())
    }

    /// Custom content block without fields of its own
    pub fn custom(key: impl Into<String>) -> Self {
        FieldGroup::Custom {
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// Custom content block that renders the given fields
    pub fn custom_with_fields(
        key: impl Into<String>,
        fields: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Self {
        FieldGroup::Custom {
            key: key.into(),
            fields: fields.into_iter().collect(),
        }
    }

    /// Descriptors contained in this group, in display order
    pub fn fields(&self) -> &[FieldDescriptor] {
        match self {
            FieldGroup::Single(field) => std::slice::from_ref(field),
            FieldGroup::Row(fields) => fields,
            FieldGroup::Custom { fields, .. } => fields,
        }
    }
}

impl From<FieldDescriptor> for FieldGroup {
    fn from(field: FieldDescriptor) -> Self {
        FieldGroup::Single(field)
    }
}

impl From<Vec<FieldDescriptor>> for FieldGroup {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        FieldGroup::Row(fields)
    }
}

// ============================================================================
// Layout rows
// ============================================================================

/// A rendered row of the layout
#[derive(Debug, Clone)]
pub enum LayoutRow<'a> {
    /// Fields laid out in `columns` equal-ish columns
    Fields {
        columns: usize,
        fields: Vec<&'a FieldDescriptor>,
    },
    /// Caller-rendered content
    Custom {
        key: &'a str,
        fields: &'a [FieldDescriptor],
    },
}

impl LayoutRow<'_> {
    /// Number of columns the row occupies
    pub fn columns(&self) -> usize {
        match self {
            LayoutRow::Fields { columns, .. } => *columns,
            LayoutRow::Custom { .. } => 1,
        }
    }
}

/// Split the groups into renderable rows.
///
/// Rows wider than [`MAX_COLUMNS`] wrap onto further rows; empty rows
/// are dropped.
pub fn layout_rows(groups: &[FieldGroup]) -> Vec<LayoutRow<'_>> {
    let mut rows = Vec::new();

    for group in groups {
        match group {
            FieldGroup::Single(field) => rows.push(LayoutRow::Fields {
                columns: 1,
                fields: vec![field],
            }),
            FieldGroup::Row(fields) => {
                for chunk in fields.chunks(MAX_COLUMNS) {
                    rows.push(LayoutRow::Fields {
                        columns: chunk.len(),
                        fields: chunk.iter().collect(),
                    });
                }
            }
            FieldGroup::Custom { key, fields } => rows.push(LayoutRow::Custom { key, fields }),
        }
    }

    rows
}

// ============================================================================
// Lookups
// ============================================================================

/// All descriptors in display order
pub fn flatten_fields(groups: &[FieldGroup]) -> Vec<&FieldDescriptor> {
    groups.iter().flat_map(|g| g.fields().iter()).collect()
}

/// Find a descriptor by name
pub fn find_field<'a>(groups: &'a [FieldGroup], name: &str) -> Option<&'a FieldDescriptor> {
    groups
        .iter()
        .flat_map(|g| g.fields().iter())
        .find(|f| f.name == name)
}

/// Names of every file field in the groups
pub fn file_field_names(groups: &[FieldGroup]) -> Vec<String> {
    flatten_fields(groups)
        .into_iter()
        .filter(|f| f.is_file())
        .map(|f| f.name.clone())
        .collect()
}

/// Ensure no field name appears twice
pub fn check_unique_names(groups: &[FieldGroup]) -> EngineResult<()> {
    let mut seen = HashSet::new();
    for field in flatten_fields(groups) {
        if !seen.insert(field.name.as_str()) {
            return Err(EngineError::DuplicateField(field.name.clone()));
        }
    }
    Ok(())
}

/// Validate every descriptor and the uniqueness of their names
pub fn validate_groups(groups: &[FieldGroup]) -> EngineResult<()> {
    check_unique_names(groups)?;
    for field in flatten_fields(groups) {
        field.validate()?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SelectOption;

    fn text(name: &str) -> FieldDescriptor {
        FieldDescriptor::text(name, name)
    }

    fn names(row: &LayoutRow<'_>) -> Vec<String> {
        match row {
            LayoutRow::Fields { fields, .. } => fields.iter().map(|f| f.name.clone()).collect(),
            LayoutRow::Custom { key, .. } => vec![format!("custom:{}", key)],
        }
    }

    #[test]
    fn test_flatten_keeps_display_order() {
        let groups = vec![
            FieldGroup::from(text("company")),
            FieldGroup::row([text("city"), text("country")]),
            FieldGroup::custom_with_fields("map", [text("lat"), text("lng")]),
        ];

        let names: Vec<_> = flatten_fields(&groups).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["company", "city", "country", "lat", "lng"]);
    }

    #[test]
    fn test_long_rows_wrap() {
        let groups = vec![FieldGroup::row((0..6).map(|i| text(&format!("f{}", i))))];
        let rows = layout_rows(&groups);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].columns(), 4);
        assert_eq!(rows[1].columns(), 2);
        assert_eq!(names(&rows[1]), vec!["f4", "f5"]);
    }

    #[test]
    fn test_custom_rows_kept_in_place() {
        let groups = vec![
            FieldGroup::from(text("name")),
            FieldGroup::custom("map"),
            FieldGroup::row(Vec::new()),
        ];
        let rows = layout_rows(&groups);

        assert_eq!(rows.len(), 2);
        assert_eq!(names(&rows[1]), vec!["custom:map"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let groups = vec![
            FieldGroup::from(text("email")),
            FieldGroup::row([text("phone"), text("email")]),
        ];

        let err = check_unique_names(&groups).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateField(ref n) if n == "email"));
    }

    #[test]
    fn test_validate_groups_checks_descriptors() {
        let groups = vec![FieldGroup::from(FieldDescriptor::select(
            "company",
            "Company",
            vec![],
        ))];
        assert!(validate_groups(&groups).is_err());

        let groups = vec![FieldGroup::from(FieldDescriptor::select(
            "company",
            "Company",
            vec![SelectOption::new(1, "Acme")],
        ))];
        assert!(validate_groups(&groups).is_ok());
    }

    #[test]
    fn test_find_field_and_file_names() {
        let groups = vec![FieldGroup::row([
            text("name"),
            FieldDescriptor::file("cv", "CV", &["pdf"]),
        ])];

        assert!(find_field(&groups, "cv").is_some());
        assert!(find_field(&groups, "missing").is_none());
        assert_eq!(file_field_names(&groups), vec!["cv"]);
    }
}
