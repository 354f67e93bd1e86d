//! Form scopes
//!
//! A scope is everything one tab of an entity modal needs: the entity
//! payload, the endpoint it is written to, the form and view layouts, and
//! the optional validator, transform and submit strategy. A modal without
//! tabs has exactly one scope.

use jobtrack_core::{EngineResult, FormData, Submode};
use jobtrack_schema::{
    EntityValidator, FieldGroup, ValidationPipeline, flatten_fields, validate_groups,
};
use std::rc::Rc;

use crate::submit::{SubmitStrategy, Transform};

/// Configuration of one tab of an entity modal
#[derive(Clone)]
pub struct FormScope {
    /// Tab key
    pub key: String,

    /// Tab label
    pub label: String,

    /// Backend endpoint, e.g. `applications`
    pub endpoint: String,

    /// Entity payload shown when the tab opens
    pub data: FormData,

    /// Submode the tab opens in
    pub submode: Submode,

    /// Layout of the editable form
    pub form_groups: Vec<FieldGroup>,

    /// Layout of the detail view; the form layout is used when empty
    pub view_groups: Vec<FieldGroup>,

    /// Whole-entity validator
    pub validator: Option<EntityValidator>,

    /// Data transformer run just before the network write
    pub transform: Option<Transform>,

    /// How validated data is committed
    pub strategy: SubmitStrategy,
}

impl FormScope {
    /// Create a scope for an endpoint
    pub fn new(key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            endpoint: endpoint.into(),
            data: FormData::new(),
            submode: Submode::View,
            form_groups: Vec::new(),
            view_groups: Vec::new(),
            validator: None,
            transform: None,
            strategy: SubmitStrategy::Default,
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the tab label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the entity payload
    pub fn with_data(mut self, data: FormData) -> Self {
        self.data = data;
        self
    }

    /// Set the submode
    pub fn with_submode(mut self, submode: Submode) -> Self {
        self.submode = submode;
        self
    }

    /// Set the form layout
    pub fn with_form(mut self, groups: Vec<FieldGroup>) -> Self {
        self.form_groups = groups;
        self
    }

    /// Set the detail view layout
    pub fn with_view(mut self, groups: Vec<FieldGroup>) -> Self {
        self.view_groups = groups;
        self
    }

    /// Set the whole-entity validator
    pub fn with_validator(mut self, validator: EntityValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Set the pre-write transform
    pub fn with_transform(mut self, transform: impl Fn(FormData) -> FormData + 'static) -> Self {
        self.transform = Some(Rc::new(transform));
        self
    }

    /// Set the submit strategy
    pub fn with_strategy(mut self, strategy: SubmitStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Layout of the detail view
    pub fn view_layout(&self) -> &[FieldGroup] {
        if self.view_groups.is_empty() {
            &self.form_groups
        } else {
            &self.view_groups
        }
    }

    /// Values a new record starts with
    pub fn defaults(&self) -> FormData {
        flatten_fields(&self.form_groups)
            .into_iter()
            .map(|f| (f.name.clone(), f.initial_value()))
            .collect()
    }

    /// Validation pipeline over the form layout
    pub fn pipeline(&self) -> ValidationPipeline {
        ValidationPipeline::new(&self.form_groups).with_entity_validator(self.validator.clone())
    }

    /// Check both layouts for duplicate names and invalid descriptors
    pub fn check(&self) -> EngineResult<()> {
        validate_groups(&self.form_groups)?;
        validate_groups(&self.view_groups)
    }
}

/// One line per scope whose layouts fail [`FormScope::check`]
pub fn scope_problems(scopes: &[FormScope]) -> Vec<String> {
    scopes
        .iter()
        .filter_map(|scope| scope.check().err().map(|e| format!("{}: {}", scope.key, e)))
        .collect()
}

impl std::fmt::Debug for FormScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormScope")
            .field("key", &self.key)
            .field("endpoint", &self.endpoint)
            .field("submode", &self.submode)
            .field("form_fields", &flatten_fields(&self.form_groups).len())
            .field("strategy", &self.strategy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobtrack_schema::FieldDescriptor;
    use serde_json::json;

    #[test]
    fn test_defaults_from_descriptors() {
        let scope = FormScope::new("company", "companies").with_form(vec![
            FieldGroup::from(FieldDescriptor::text("name", "Name")),
            FieldGroup::row([
                FieldDescriptor::checkbox("remote", "Remote"),
                FieldDescriptor::text("status", "Status").with_default("applied"),
            ]),
        ]);

        let defaults = scope.defaults();
        assert_eq!(defaults["name"], json!(null));
        assert_eq!(defaults["remote"], json!(false));
        assert_eq!(defaults["status"], json!("applied"));
    }

    #[test]
    fn test_view_layout_falls_back_to_form() {
        let scope = FormScope::new("company", "companies")
            .with_form(vec![FieldGroup::from(FieldDescriptor::text("name", "Name"))]);
        assert_eq!(scope.view_layout().len(), 1);
    }

    #[test]
    fn test_check_rejects_duplicate_names() {
        let scope = FormScope::new("company", "companies").with_form(vec![
            FieldGroup::from(FieldDescriptor::text("name", "Name")),
            FieldGroup::from(FieldDescriptor::text("name", "Other")),
        ]);
        assert!(scope.check().is_err());
    }

    #[test]
    fn test_scope_problems_names_failing_scope() {
        let good = FormScope::new("company", "companies")
            .with_form(vec![FieldGroup::from(FieldDescriptor::text("name", "Name"))]);
        let bad = FormScope::new("contacts", "contacts").with_form(vec![FieldGroup::from(
            FieldDescriptor::select("company", "Company", vec![]),
        )]);

        assert!(scope_problems(&[good.clone()]).is_empty());

        let problems = scope_problems(&[good, bad]);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("contacts: "));
    }
}
