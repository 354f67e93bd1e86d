//! Form validation pipeline
//!
//! Validation runs in three stages whose error maps are merged:
//!
//! 1. **Required**: every required field must hold a value
//! 2. **Per-field**: declarative rules, then the field's own validator
//! 3. **Entity**: a whole-form validator, run only when stages 1 and 2
//!    found nothing, so remote duplicate checks never see incomplete data
//!
//! Messages for the same field are newline-joined rather than replaced.

use futures::FutureExt;
use futures::future::{LocalBoxFuture, join_all};
use jobtrack_core::{FieldErrors, FormData, is_missing};
use serde_json::Value;
use std::future::Future;
use std::rc::Rc;

use crate::field::{FieldDescriptor, to_title_case};
use crate::layout::{FieldGroup, flatten_fields};

// ============================================================================
// FieldCheck
// ============================================================================

/// Outcome of a per-field validator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldCheck {
    /// Whether the value is valid; `None` counts as valid
    pub is_valid: Option<bool>,

    /// Message shown when invalid
    pub message: Option<String>,
}

impl FieldCheck {
    /// A passing check
    pub fn valid() -> Self {
        Self {
            is_valid: Some(true),
            message: None,
        }
    }

    /// A failing check with a message
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: Some(false),
            message: Some(message.into()),
        }
    }

    /// Check if the value passed
    pub fn passed(&self) -> bool {
        self.is_valid.unwrap_or(true)
    }

    /// Message of a failed check, or `"<label> is invalid"` when it has none
    pub fn failure_message(&self, label: &str) -> String {
        match self.message.as_deref() {
            Some(message) if !message.trim().is_empty() => message.to_string(),
            _ => format!("{} is invalid", label),
        }
    }
}


impl From<Result<(), String>> for FieldCheck {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => FieldCheck::valid(),
            Err(message) => FieldCheck::invalid(message),
        }
    }
}

// ============================================================================
// FieldValidator
// ============================================================================

type SyncFieldFn = dyn Fn(&Value, &FormData) -> FieldCheck;
type AsyncFieldFn = dyn Fn(Value, FormData) -> LocalBoxFuture<'static, FieldCheck>;

/// Custom validator attached to a single field
#[derive(Clone)]
pub enum FieldValidator {
    /// Runs immediately
    Sync(Rc<SyncFieldFn>),
    /// Resolves later (e.g. a remote uniqueness check)
    Async(Rc<AsyncFieldFn>),
}

impl FieldValidator {
    /// Wrap a synchronous validator
    pub fn sync(f: impl Fn(&Value, &FormData) -> FieldCheck + 'static) -> Self {
        FieldValidator::Sync(Rc::new(f))
    }

    /// Wrap an asynchronous validator
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Value, FormData) -> Fut + 'static,
        Fut: Future<Output = FieldCheck> + 'static,
    {
        FieldValidator::Async(Rc::new(move |value, data| f(value, data).boxed_local()))
    }

    /// Run the validator against a value and the whole form
    pub async fn check(&self, value: &Value, data: &FormData) -> FieldCheck {
        match self {
            FieldValidator::Sync(f) => f(value, data),
            FieldValidator::Async(f) => f(value.clone(), data.clone()).await,
        }
    }
}

impl std::fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValidator::Sync(_) => write!(f, "FieldValidator::Sync"),
            FieldValidator::Async(_) => write!(f, "FieldValidator::Async"),
        }
    }
}

// ============================================================================
// EntityValidator
// ============================================================================

type SyncEntityFn = dyn Fn(&FormData) -> FieldErrors;
type AsyncEntityFn = dyn Fn(FormData) -> LocalBoxFuture<'static, FieldErrors>;

/// Whole-form validator
#[derive(Clone)]
pub enum EntityValidator {
    /// Function from form data to an error map
    Sync(Rc<SyncEntityFn>),
    /// Asynchronous function from form data to an error map
    Async(Rc<AsyncEntityFn>),
    /// Per-field validators run concurrently against the whole form
    PerField(Vec<(String, FieldValidator)>),
}

impl EntityValidator {
    /// Wrap a synchronous entity validator
    pub fn sync(f: impl Fn(&FormData) -> FieldErrors + 'static) -> Self {
        EntityValidator::Sync(Rc::new(f))
    }

    /// Wrap an asynchronous entity validator
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(FormData) -> Fut + 'static,
        Fut: Future<Output = FieldErrors> + 'static,
    {
        EntityValidator::Async(Rc::new(move |data| f(data).boxed_local()))
    }

    /// Build from a list of (field name, validator) pairs
    pub fn per_field<N: Into<String>>(
        validators: impl IntoIterator<Item = (N, FieldValidator)>,
    ) -> Self {
        EntityValidator::PerField(
            validators
                .into_iter()
                .map(|(name, v)| (name.into(), v))
                .collect(),
        )
    }

    /// Run the validator
    pub async fn run(&self, data: &FormData) -> FieldErrors {
        match self {
            EntityValidator::Sync(f) => f(data),
            EntityValidator::Async(f) => f(data.clone()).await,
            EntityValidator::PerField(validators) => {
                let checks = validators.iter().map(|(name, validator)| async move {
                    let value = data.get(name).cloned().unwrap_or(Value::Null);
                    (name, validator.check(&value, data).await)
                });

                let mut errors = FieldErrors::new();
                for (name, check) in join_all(checks).await {
                    if !check.passed() {
                        errors.append(name.clone(), check.failure_message(&to_title_case(name)));
                    }
                }
                errors
            }
        }
    }
}

impl std::fmt::Debug for EntityValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityValidator::Sync(_) => write!(f, "EntityValidator::Sync"),
            EntityValidator::Async(_) => write!(f, "EntityValidator::Async"),
            EntityValidator::PerField(v) => write!(f, "EntityValidator::PerField({})", v.len()),
        }
    }
}

// ============================================================================
// ValidationPipeline
// ============================================================================

/// Validates form data against a set of form-mode descriptors
#[derive(Debug, Clone, Default)]
pub struct ValidationPipeline {
    fields: Vec<FieldDescriptor>,
    entity: Option<EntityValidator>,
}

impl ValidationPipeline {
    /// Create a pipeline for the fields reachable from the given groups
    pub fn new(groups: &[FieldGroup]) -> Self {
        Self {
            fields: flatten_fields(groups).into_iter().cloned().collect(),
            entity: None,
        }
    }

    /// Create a pipeline for an explicit list of descriptors
    pub fn from_fields(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields,
            entity: None,
        }
    }

    /// Attach a whole-entity validator
    pub fn with_entity_validator(mut self, validator: Option<EntityValidator>) -> Self {
        self.entity = validator;
        self
    }

    /// Stage 1: record a message for every required field without a value
    pub fn check_required(&self, data: &FormData) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in self.fields.iter().filter(|f| f.required) {
            if is_missing(data.get(&field.name)) {
                errors.append(field.name.clone(), field.required_message());
            }
        }
        errors
    }

    /// Stage 2: declarative rules and custom validators.
    ///
    /// Fields already present in `flagged` are skipped.
    pub async fn check_fields(&self, data: &FormData, flagged: &FieldErrors) -> FieldErrors {
        let checks = self
            .fields
            .iter()
            .filter(|f| !flagged.contains(&f.name))
            .map(|field| async move {
                let value = data.get(&field.name).cloned().unwrap_or(Value::Null);
                let mut messages = Vec::new();

                if !is_missing(Some(&value)) {
                    messages.extend(field.rules.iter().filter_map(|r| r.check(&value).err()));
                }

                if let Some(validator) = &field.validator {
                    let check = validator.check(&value, data).await;
                    if !check.passed() {
                        messages.push(check.failure_message(&field.display_label()));
                    }
                }

                (field.name.as_str(), messages)
            });

        let mut errors = FieldErrors::new();
        for (name, messages) in join_all(checks).await {
            for message in messages {
                errors.append(name, message);
            }
        }
        errors
    }

    /// Stage 3: the whole-entity validator, if any
    pub async fn check_entity(&self, data: &FormData) -> FieldErrors {
        match &self.entity {
            Some(validator) => validator.run(data).await,
            None => FieldErrors::new(),
        }
    }

    /// Run all stages and return the merged error map
    pub async fn validate(&self, data: &FormData) -> FieldErrors {
        let mut errors = self.check_required(data);
        let field_errors = self.check_fields(data, &errors).await;
        errors.merge(field_errors);

        if errors.is_empty() {
            errors.merge(self.check_entity(data).await);
        } else {
            tracing::debug!(
                "Skipping entity validation, {} field(s) already invalid",
                errors.len()
            );
        }

        if !errors.is_empty() {
            tracing::debug!(
                "Validation failed for: {}",
                errors.fields().collect::<Vec<_>>().join(", ")
            );
        }
        errors
    }
}

/// Validate form data against groups and an optional entity validator
pub async fn validate_form(
    groups: &[FieldGroup],
    data: &FormData,
    entity: Option<&EntityValidator>,
) -> FieldErrors {
    ValidationPipeline::new(groups)
        .with_entity_validator(entity.cloned())
        .validate(data)
        .await
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::Cell;
    use tokio_test::block_on;

    fn form(value: Value) -> FormData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_required_email_message() {
        let groups = vec![FieldGroup::from(
            FieldDescriptor::text("email", "Email").required(),
        )];
        let errors = block_on(validate_form(&groups, &form(json!({"email": ""})), None));

        let expected: FieldErrors = [("email", "Email is required")].into_iter().collect();
        assert_eq!(errors, expected);
    }

    #[test]
    fn test_zero_and_false_are_present() {
        let groups = vec![FieldGroup::row([
            FieldDescriptor::text("count", "Count").required(),
            FieldDescriptor::checkbox("remote", "Remote").required(),
            FieldDescriptor::multiselect("tags", "Tags", vec![]).disabled().required(),
        ])];
        let data = form(json!({"count": 0, "remote": false, "tags": []}));
        let errors = block_on(validate_form(&groups, &data, None));

        assert!(!errors.contains("count"));
        assert!(!errors.contains("remote"));
        assert_eq!(errors.get("tags"), Some("Tags is required"));
    }

    #[test]
    fn test_rules_skip_empty_optional_fields() {
        let groups = vec![FieldGroup::from(FieldDescriptor::email("email", "Email"))];
        let errors = block_on(validate_form(&groups, &form(json!({"email": ""})), None));
        assert!(errors.is_empty());

        let errors = block_on(validate_form(&groups, &form(json!({"email": "nope"})), None));
        assert_eq!(errors.get("email"), Some("Must be a valid email address"));
    }

    #[test]
    fn test_custom_validator_skipped_when_required_fails() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let groups = vec![FieldGroup::from(
            FieldDescriptor::text("name", "Name")
                .required()
                .with_validator(FieldValidator::sync(move |_, _| {
                    counter.set(counter.get() + 1);
                    FieldCheck::invalid("bad")
                })),
        )];

        let errors = block_on(validate_form(&groups, &form(json!({})), None));
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_missing_is_valid_counts_as_valid() {
        let groups = vec![FieldGroup::from(
            FieldDescriptor::text("name", "Name")
                .with_validator(FieldValidator::sync(|_, _| FieldCheck::default())),
        )];
        let errors = block_on(validate_form(&groups, &form(json!({"name": "x"})), None));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_async_field_validator_sees_whole_form() {
        let groups = vec![FieldGroup::row([
            FieldDescriptor::text("min", "Min"),
            FieldDescriptor::text("max", "Max").with_validator(FieldValidator::from_async(
                |value: Value, data: FormData| async move {
                    let min = data.get("min").and_then(Value::as_i64).unwrap_or(0);
                    if value.as_i64().unwrap_or(0) < min {
                        FieldCheck::invalid("Max must not be below min")
                    } else {
                        FieldCheck::valid()
                    }
                },
            )),
        ])];

        let errors = block_on(validate_form(&groups, &form(json!({"min": 5, "max": 3})), None));
        assert_eq!(errors.get("max"), Some("Max must not be below min"));
    }

    #[test]
    fn test_rule_and_validator_messages_are_joined() {
        let groups = vec![FieldGroup::from(
            FieldDescriptor::text("code", "Code")
                .with_rule(Rule::MinLength(3))
                .with_validator(FieldValidator::sync(|_, _| FieldCheck::invalid("Unknown code"))),
        )];
        let errors = block_on(validate_form(&groups, &form(json!({"code": "ab"})), None));
        assert_eq!(
            errors.get("code"),
            Some("Minimum length is 3 characters\nUnknown code")
        );
    }

    #[test]
    fn test_entity_stage_skipped_when_earlier_stage_fails() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let entity = EntityValidator::sync(move |_| {
            counter.set(counter.get() + 1);
            [("name", "Duplicate")].into_iter().collect()
        });
        let groups = vec![FieldGroup::from(
            FieldDescriptor::text("name", "Name").required(),
        )];

        let errors = block_on(validate_form(&groups, &form(json!({})), Some(&entity)));
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(calls.get(), 0);

        let errors = block_on(validate_form(
            &groups,
            &form(json!({"name": "Acme"})),
            Some(&entity),
        ));
        assert_eq!(errors.get("name"), Some("Duplicate"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_per_field_entity_validators() {
        let entity = EntityValidator::per_field([
            (
                "name",
                FieldValidator::from_async(|value: Value, _| async move {
                    if value == json!("Acme") {
                        FieldCheck::invalid("A company with this name already exists")
                    } else {
                        FieldCheck::valid()
                    }
                }),
            ),
            (
                "website",
                FieldValidator::sync(|_, _| FieldCheck::invalid("Website unreachable")),
            ),
        ]);
        let data = form(json!({"name": "Acme", "website": "https://acme.io"}));
        let errors = block_on(entity.run(&data));

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get("name"),
            Some("A company with this name already exists")
        );
    }

    #[test]
    fn test_failing_field_validator_without_message_blocks() {
        let groups = vec![FieldGroup::from(
            FieldDescriptor::text("name", "Name")
                .with_validator(FieldValidator::sync(|_, _| FieldCheck::invalid(""))),
        )];
        let errors = block_on(validate_form(&groups, &form(json!({"name": "Acme"})), None));
        assert_eq!(errors.get("name"), Some("Name is invalid"));
    }

    #[test]
    fn test_failing_per_field_entity_validator_without_message_blocks() {
        let entity = EntityValidator::per_field([(
            "start_date",
            FieldValidator::sync(|_, _| FieldCheck {
                is_valid: Some(false),
                message: None,
            }),
        )]);
        let pipeline = ValidationPipeline::from_fields(vec![]).with_entity_validator(Some(entity));
        let errors = block_on(pipeline.validate(&form(json!({"start_date": "2024-01-01"}))));
        assert_eq!(errors.get("start_date"), Some("Start Date is invalid"));
    }

    #[test]
    fn test_entity_validator_empty_message_still_blocks() {
        let entity = EntityValidator::sync(|_| [("name", "")].into_iter().collect());
        let pipeline = ValidationPipeline::from_fields(vec![]).with_entity_validator(Some(entity));
        let errors = block_on(pipeline.validate(&form(json!({"name": "Acme"}))));
        assert!(errors.contains("name"));
    }

    #[test]
    fn test_async_entity_validator() {
        let entity = EntityValidator::from_async(|data: FormData| async move {
            let mut errors = FieldErrors::new();
            if data.get("start") == data.get("end") {
                errors.append("end", "End must differ from start");
            }
            errors
        });
        let pipeline = ValidationPipeline::from_fields(vec![]).with_entity_validator(Some(entity));
        let errors = block_on(pipeline.validate(&form(json!({"start": 1, "end": 1}))));
        assert_eq!(errors.get("end"), Some("End must differ from start"));
    }
}
