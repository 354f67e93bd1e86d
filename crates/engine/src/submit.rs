//! Submission strategies
//!
//! The default strategy writes the (transformed) form data straight to the
//! backend. A custom strategy receives the raw submitted fields and a
//! [`Committer`]; it may run any async side work first and then calls
//! [`Committer::commit`] once. `commit` consumes the committer and the
//! handler must return the [`Committed`] token it produced, so a handler
//! either commits exactly once or returns an error.

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use jobtrack_client::{Backend, FileFieldMapping, FileStore};
use jobtrack_core::{EngineError, EngineResult, FormData, RecordId, Submode};
use serde_json::Value;
use std::future::Future;
use std::rc::Rc;

/// Data transformer run just before the network write
pub type Transform = Rc<dyn Fn(FormData) -> FormData>;

// ============================================================================
// Committer
// ============================================================================

/// Continuation that performs the entity write
pub struct Committer {
    backend: Rc<dyn Backend>,
    endpoint: String,
    submode: Submode,
    id: Option<RecordId>,
    transform: Option<Transform>,
}

/// Proof that the entity write happened; carries the server representation
#[derive(Debug)]
pub struct Committed(Value);

impl Committed {
    /// Server representation of the written entity
    pub fn entity(&self) -> &Value {
        &self.0
    }

    /// Take the server representation
    pub fn into_entity(self) -> Value {
        self.0
    }
}

impl Committer {
    /// Create a committer for one submission
    pub fn new(
        backend: Rc<dyn Backend>,
        endpoint: impl Into<String>,
        submode: Submode,
        id: Option<RecordId>,
    ) -> Self {
        Self {
            backend,
            endpoint: endpoint.into(),
            submode,
            id,
            transform: None,
        }
    }

    /// Run `transform` on the data before writing
    pub fn with_transform(mut self, transform: Option<Transform>) -> Self {
        self.transform = transform;
        self
    }

    /// Backend the entity will be written to
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    /// Endpoint the entity will be written to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Write the entity: `POST` when adding or no id is known, `PUT` otherwise
    pub async fn commit(self, data: FormData) -> EngineResult<Committed> {
        let data = match &self.transform {
            Some(transform) => transform(data),
            None => data,
        };
        let body = Value::Object(data);

        let entity = match (&self.id, self.submode) {
            (Some(id), Submode::View | Submode::Edit) => {
                tracing::info!("Updating {} {}", self.endpoint, id);
                self.backend.update(&self.endpoint, id, &body).await?
            }
            _ => {
                tracing::info!("Creating record in {}", self.endpoint);
                self.backend.create(&self.endpoint, &body).await?
            }
        };

        // Some backends answer updates with an empty body
        let entity = match entity {
            Value::Null => body,
            other => other,
        };
        Ok(Committed(entity))
    }
}

// ============================================================================
// SubmitStrategy
// ============================================================================

type CustomSubmitFn = dyn Fn(FormData, Committer) -> LocalBoxFuture<'static, EngineResult<Committed>>;

/// How validated form data becomes a committed entity
#[derive(Clone, Default)]
pub enum SubmitStrategy {
    /// Transform then `POST`/`PUT`
    #[default]
    Default,
    /// Caller-supplied handler wrapping the commit
    Custom(Rc<CustomSubmitFn>),
}

impl SubmitStrategy {
    /// Wrap a custom async handler
    pub fn custom<F, Fut>(handler: F) -> Self
    where
        F: Fn(FormData, Committer) -> Fut + 'static,
        Fut: Future<Output = EngineResult<Committed>> + 'static,
    {
        SubmitStrategy::Custom(Rc::new(move |data, committer| {
            handler(data, committer).boxed_local()
        }))
    }

    /// Route the given file fields through attachment de-duplication
    /// before committing.
    pub fn with_file_fields(mappings: Vec<FileFieldMapping>) -> Self {
        let mappings = Rc::new(mappings);
        Self::custom(move |mut data, committer| {
            let mappings = mappings.clone();
            async move {
                FileStore::new(committer.backend())
                    .resolve_file_fields(&mut data, &mappings)
                    .await?;
                committer.commit(data).await
            }
        })
    }

    /// Run the strategy
    pub async fn run(&self, data: FormData, committer: Committer) -> EngineResult<Committed> {
        match self {
            SubmitStrategy::Default => committer.commit(data).await,
            SubmitStrategy::Custom(handler) => handler(data, committer).await,
        }
    }
}

impl std::fmt::Debug for SubmitStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitStrategy::Default => write!(f, "SubmitStrategy::Default"),
            SubmitStrategy::Custom(_) => write!(f, "SubmitStrategy::Custom"),
        }
    }
}

/// Abort a custom submission with a message
pub fn abort(message: impl Into<String>) -> EngineResult<Committed> {
    Err(EngineError::validation(message))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use jobtrack_client::{InMemoryBackend, PendingUpload};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_test::block_on;

    fn form(value: Value) -> FormData {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_default_add_posts() {
        let backend = Rc::new(InMemoryBackend::new());
        let committer = Committer::new(backend.clone(), "companies", Submode::Add, None);

        let committed =
            block_on(SubmitStrategy::Default.run(form(json!({"name": "Acme"})), committer))
                .unwrap();
        assert_eq!(committed.entity(), &json!({"id": 1, "name": "Acme"}));
        assert_eq!(backend.calls(), vec!["POST companies/"]);
    }

    #[test]
    fn test_default_edit_puts_transformed_data() {
        let backend = Rc::new(
            InMemoryBackend::new().with_records("companies", vec![json!({"id": 4, "name": "Acme"})]),
        );
        let transform: Transform = Rc::new(|mut data| {
            data.remove("display_name");
            data
        });
        let committer = Committer::new(backend.clone(), "companies", Submode::Edit, Some(4.into()))
            .with_transform(Some(transform));

        let committed = block_on(SubmitStrategy::Default.run(
            form(json!({"id": 4, "name": "Acme Corp", "display_name": "x"})),
            committer,
        ))
        .unwrap();
        assert_eq!(committed.into_entity(), json!({"id": 4, "name": "Acme Corp"}));
        assert_eq!(backend.calls(), vec!["PUT companies/4"]);
    }

    #[test]
    fn test_custom_handler_can_abort_without_write() {
        let backend = Rc::new(InMemoryBackend::new());
        let strategy = SubmitStrategy::custom(|_data, _committer| async { abort("Not today") });
        let committer = Committer::new(backend.clone(), "companies", Submode::Add, None);

        let err = block_on(strategy.run(FormData::new(), committer)).unwrap_err();
        assert_eq!(err.user_message(), "Not today");
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_custom_handler_sees_raw_fields() {
        let backend = Rc::new(InMemoryBackend::new());
        let strategy = SubmitStrategy::custom(|mut data, committer| async move {
            let name = data
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_uppercase();
            data.insert("name".to_string(), json!(name));
            committer.commit(data).await
        });
        let committer = Committer::new(backend.clone(), "companies", Submode::Add, None);

        let committed =
            block_on(strategy.run(form(json!({"name": "acme"})), committer)).unwrap();
        assert_eq!(committed.entity()["name"], json!("ACME"));
    }

    #[test]
    fn test_file_fields_processed_before_entity_write() {
        let backend = Rc::new(InMemoryBackend::new());
        let strategy = SubmitStrategy::with_file_fields(vec![FileFieldMapping::same("cv")]);
        let upload = PendingUpload::from_bytes("cv.pdf", b"%PDF", "application/pdf");
        let committer = Committer::new(backend.clone(), "applications", Submode::Add, None);

        let committed = block_on(strategy.run(
            form(json!({"role": "Engineer", "cv": upload.to_form_value()})),
            committer,
        ))
        .unwrap();

        assert_eq!(
            backend.calls(),
            vec!["GET files/", "POST files/", "POST applications/"]
        );
        assert_eq!(committed.entity()["cv"], json!(1));
    }

    #[test]
    fn test_file_failure_means_no_entity_write() {
        let backend = Rc::new(InMemoryBackend::new());
        backend.fail_next("POST files/", 500, "");
        let strategy = SubmitStrategy::with_file_fields(vec![FileFieldMapping::same("cv")]);
        let upload = PendingUpload::from_bytes("cv.pdf", b"%PDF", "application/pdf");
        let committer = Committer::new(backend.clone(), "applications", Submode::Add, None);

        let err = block_on(strategy.run(form(json!({"cv": upload.to_form_value()})), committer))
            .unwrap_err();

        assert!(err.is_file_processing());
        assert_eq!(backend.count_calls("POST applications/"), 0);
    }
}
