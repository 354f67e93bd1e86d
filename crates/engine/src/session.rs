//! Entity modal state machine
//!
//! A [`ModalSession`] holds everything one entity modal shows: the active
//! tab, the current and original form snapshots, field errors and the
//! submission state. It has no UI dependency; the Dioxus layer keeps one
//! in a signal and forwards user events to it.
//!
//! ```text
//!            open(view)            edit()
//!  Closed ─────────────▶ Viewing ─────────▶ Editing ◀──┐
//!    ▲  open(add/edit)                       │  ▲       │ invalid /
//!    └──────────────────────────────────────┘  │       │ failed
//!                                 begin_submit()│       │
//!                                               ▼       │
//!                                           Submitting ─┘
//! ```
//!
//! Async work (submission, delete) is split into a `begin_*` call that
//! returns an owned job, the job's future, and a `complete_*` call. Every
//! job carries the session generation at the time it began; results for an
//! older generation are discarded.

use jobtrack_client::Backend;
use jobtrack_core::{
    EngineError, EngineResult, FieldErrors, FormData, RecordId, Submode, changed_fields,
    forms_differ,
};
use jobtrack_schema::{FieldGroup, ValidationPipeline};
use serde_json::Value;
use std::rc::Rc;

use crate::scope::{FormScope, scope_problems};
use crate::submit::{Committer, SubmitStrategy};

// ============================================================================
// Phase & outcomes
// ============================================================================

/// Current state of the modal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Hidden
    #[default]
    Closed,
    /// Read-only detail view
    Viewing,
    /// Editable form
    Editing,
    /// Submission in flight
    Submitting,
}

/// Result of a cancel or close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardOutcome {
    /// Done without asking
    Done,
    /// Unsaved edits exist; call `confirm_discard` or `keep_editing`
    NeedsConfirmation,
}

/// What a confirmed discard will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardAction {
    /// Return to the detail view
    CancelEdit,
    /// Close the modal
    Close,
}

/// Category of the modal-level error banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// Saving the entity failed
    Submission,
    /// Attachment processing failed before the entity write
    FileProcessing,
    /// Deleting the entity failed
    Delete,
}

/// Modal-level error message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

/// What happened when a submission completed
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitEvent {
    /// Validation failed; errors are set and the form stays open
    Invalid,
    /// Saved; the modal shows the server representation
    Saved(Value),
    /// Saved; the modal closed
    Closed(Value),
    /// Saving failed; the banner is set and form data is untouched
    Failed,
    /// The session moved on before the result arrived
    Stale,
}

// ============================================================================
// Submit jobs
// ============================================================================

/// Outcome of a submission job
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation produced errors; nothing was sent
    Invalid(FieldErrors),
    /// The entity was written
    Saved(Value),
    /// The write (or attachment processing) failed
    Failed(EngineError),
}

/// Owned submission work created by [`ModalSession::begin_submit`]
pub struct SubmitJob {
    generation: u64,
    data: FormData,
    pipeline: ValidationPipeline,
    strategy: SubmitStrategy,
    committer: Committer,
}

/// Finished submission, handed back to [`ModalSession::complete_submit`]
#[derive(Debug)]
pub struct SubmitCompletion {
    generation: u64,
    outcome: SubmitOutcome,
}

impl SubmitCompletion {
    /// Outcome of the job
    pub fn outcome(&self) -> &SubmitOutcome {
        &self.outcome
    }
}

impl SubmitJob {
    /// Validate and, when valid, run the submit strategy
    pub async fn run(self) -> SubmitCompletion {
        let outcome = {
            let errors = self.pipeline.validate(&self.data).await;
            if !errors.is_empty() {
                SubmitOutcome::Invalid(errors)
            } else {
                match self.strategy.run(self.data, self.committer).await {
                    Ok(committed) => SubmitOutcome::Saved(committed.into_entity()),
                    Err(err) => SubmitOutcome::Failed(err),
                }
            }
        };

        SubmitCompletion {
            generation: self.generation,
            outcome,
        }
    }
}

/// Owned delete work created by [`ModalSession::begin_delete`]
pub struct DeleteJob {
    generation: u64,
    backend: Rc<dyn Backend>,
    endpoint: String,
    id: RecordId,
}

/// Finished delete, handed back to [`ModalSession::complete_delete`]
#[derive(Debug)]
pub struct DeleteCompletion {
    generation: u64,
    id: RecordId,
    result: EngineResult<()>,
}

impl DeleteJob {
    /// Issue the `DELETE`
    pub async fn run(self) -> DeleteCompletion {
        tracing::info!("Deleting {} {}", self.endpoint, self.id);
        let result = self.backend.delete(&self.endpoint, &self.id).await;
        DeleteCompletion {
            generation: self.generation,
            id: self.id,
            result,
        }
    }
}

// ============================================================================
// ModalSession
// ============================================================================

type EntityCallback = Rc<dyn Fn(&Value)>;
type DeleteCallback = Rc<dyn Fn(&RecordId)>;

/// State of one entity modal
pub struct ModalSession {
    backend: Rc<dyn Backend>,
    scopes: Vec<FormScope>,
    phase: Phase,
    active_tab: usize,
    submode: Submode,
    form_data: FormData,
    original_form_data: FormData,
    server_data: FormData,
    errors: FieldErrors,
    banner: Option<Banner>,
    generation: u64,
    pending_discard: Option<DiscardAction>,
    on_success: Option<EntityCallback>,
    on_delete: Option<DeleteCallback>,
}

impl ModalSession {
    /// Create a closed session over one or more tab scopes
    pub fn new(backend: Rc<dyn Backend>, scopes: Vec<FormScope>) -> Self {
        warn_scope_problems(&scopes);
        Self {
            backend,
            scopes,
            phase: Phase::Closed,
            active_tab: 0,
            submode: Submode::View,
            form_data: FormData::new(),
            original_form_data: FormData::new(),
            server_data: FormData::new(),
            errors: FieldErrors::new(),
            banner: None,
            generation: 0,
            pending_discard: None,
            on_success: None,
            on_delete: None,
        }
    }

    /// Create a closed session with a single scope
    pub fn single(backend: Rc<dyn Backend>, scope: FormScope) -> Self {
        Self::new(backend, vec![scope])
    }

    /// Called with the server entity after every successful save
    pub fn with_on_success(mut self, callback: impl Fn(&Value) + 'static) -> Self {
        self.on_success = Some(Rc::new(callback));
        self
    }

    /// Called with the id after a successful delete
    pub fn with_on_delete(mut self, callback: impl Fn(&RecordId) + 'static) -> Self {
        self.on_delete = Some(Rc::new(callback));
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn submode(&self) -> Submode {
        self.submode
    }

    pub fn is_open(&self) -> bool {
        self.phase != Phase::Closed
    }

    /// Whether the editable form is shown
    pub fn is_editing(&self) -> bool {
        matches!(self.phase, Phase::Editing | Phase::Submitting)
    }

    /// Whether a submission is in flight
    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    pub fn original_form_data(&self) -> &FormData {
        &self.original_form_data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_tab(&self) -> usize {
        self.active_tab
    }

    pub fn scopes(&self) -> &[FormScope] {
        &self.scopes
    }

    /// Discard waiting for confirmation, if any
    pub fn pending_discard(&self) -> Option<DiscardAction> {
        self.pending_discard
    }

    /// Scope of the active tab
    pub fn scope(&self) -> Option<&FormScope> {
        self.scopes.get(self.active_tab)
    }

    /// Layout for the current phase (form while editing, view otherwise)
    pub fn active_groups(&self) -> &[FieldGroup] {
        match self.scope() {
            Some(scope) if self.is_editing() => &scope.form_groups,
            Some(scope) => scope.view_layout(),
            None => &[],
        }
    }

    /// Id of the entity being shown
    pub fn record_id(&self) -> Option<RecordId> {
        RecordId::of(&self.server_data).or_else(|| RecordId::of(&self.form_data))
    }

    /// Whether the form differs from the snapshot taken when editing began
    pub fn has_unsaved_changes(&self) -> bool {
        self.is_editing() && forms_differ(&self.original_form_data, &self.form_data)
    }

    /// Names of the fields edited since editing began
    pub fn changed_fields(&self) -> Vec<String> {
        changed_fields(&self.original_form_data, &self.form_data)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Show the modal.
    ///
    /// `data` overrides the active scope's own payload. Opening an already
    /// open modal is ignored so prop updates do not wipe edits.
    pub fn open(&mut self, data: Option<FormData>, submode: Submode) -> bool {
        if self.is_open() {
            tracing::debug!("Ignoring open: modal already shown");
            return false;
        }
        let data = data.unwrap_or_else(|| {
            self.scope()
                .map(|scope| scope.data.clone())
                .unwrap_or_default()
        });
        self.seed(data, submode);
        true
    }

    /// Show the modal with the first tab's own payload and submode
    pub fn open_default(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        self.active_tab = 0;
        let Some((data, submode)) = self.scope().map(|s| (s.data.clone(), s.submode)) else {
            return false;
        };
        self.open(Some(data), submode)
    }

    fn seed(&mut self, data: FormData, submode: Submode) {
        let form_data = match (submode, self.scope()) {
            (Submode::Add, Some(scope)) => {
                let mut defaults = scope.defaults();
                defaults.extend(data.clone());
                defaults
            }
            _ => data.clone(),
        };

        self.submode = submode;
        self.server_data = data;
        self.original_form_data = form_data.clone();
        self.form_data = form_data;
        self.errors.clear();
        self.banner = None;
        self.pending_discard = None;
        self.generation += 1;
        self.phase = if submode.starts_editing() {
            Phase::Editing
        } else {
            Phase::Viewing
        };

        tracing::debug!(
            "Modal seeded: tab={} submode={} phase={:?} generation={}",
            self.active_tab,
            submode,
            self.phase,
            self.generation
        );
    }

    /// Viewing → Editing
    pub fn edit(&mut self) -> EngineResult<()> {
        if self.phase != Phase::Viewing {
            return Err(EngineError::invalid_state(format!(
                "cannot edit from {:?}",
                self.phase
            )));
        }
        self.original_form_data = self.form_data.clone();
        self.errors.clear();
        self.banner = None;
        self.phase = Phase::Editing;
        tracing::debug!("Modal entered editing");
        Ok(())
    }

    /// Leave editing, restoring the last server representation.
    ///
    /// In submode edit with unsaved changes nothing happens until
    /// [`confirm_discard`](Self::confirm_discard).
    pub fn cancel_edit(&mut self) -> EngineResult<DiscardOutcome> {
        if !self.is_editing() {
            return Err(EngineError::invalid_state("not editing"));
        }
        if self.needs_confirmation() {
            self.pending_discard = Some(DiscardAction::CancelEdit);
            return Ok(DiscardOutcome::NeedsConfirmation);
        }
        self.do_cancel_edit();
        Ok(DiscardOutcome::Done)
    }

    /// Close the modal, asking first when edits would be lost
    pub fn request_close(&mut self) -> DiscardOutcome {
        if self.needs_confirmation() {
            self.pending_discard = Some(DiscardAction::Close);
            return DiscardOutcome::NeedsConfirmation;
        }
        self.close();
        DiscardOutcome::Done
    }

    /// Carry out the discard that was waiting for confirmation
    pub fn confirm_discard(&mut self) {
        match self.pending_discard.take() {
            Some(DiscardAction::CancelEdit) => self.do_cancel_edit(),
            Some(DiscardAction::Close) => self.close(),
            None => tracing::debug!("No discard pending"),
        }
    }

    /// Drop the pending discard and keep editing
    pub fn keep_editing(&mut self) {
        self.pending_discard = None;
    }

    fn needs_confirmation(&self) -> bool {
        self.submode == Submode::Edit && self.has_unsaved_changes()
    }

    fn do_cancel_edit(&mut self) {
        if self.submode == Submode::Add {
            self.close();
            return;
        }
        self.form_data = self.server_data.clone();
        self.original_form_data = self.server_data.clone();
        self.errors.clear();
        self.banner = None;
        self.pending_discard = None;
        self.generation += 1;
        self.phase = Phase::Viewing;
        tracing::debug!("Edit cancelled, generation={}", self.generation);
    }

    /// Hide the modal and drop its state
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
        self.form_data.clear();
        self.original_form_data.clear();
        self.server_data.clear();
        self.errors.clear();
        self.banner = None;
        self.pending_discard = None;
        self.generation += 1;
        tracing::debug!("Modal closed, generation={}", self.generation);
    }

    /// Update a field and clear its error
    pub fn set_field(&mut self, name: &str, value: Value) -> EngineResult<()> {
        if self.phase != Phase::Editing {
            return Err(EngineError::invalid_state(format!(
                "cannot edit '{}' while {:?}",
                name, self.phase
            )));
        }
        self.form_data.insert(name.to_string(), value);
        self.errors.remove(name);
        Ok(())
    }

    /// Switch to the tab with the given key, re-seeding from its own data
    pub fn change_tab(&mut self, key: &str) -> EngineResult<()> {
        let index = self
            .scopes
            .iter()
            .position(|s| s.key == key)
            .ok_or_else(|| EngineError::invalid_state(format!("unknown tab '{}'", key)))?;
        self.change_tab_index(index)
    }

    /// Switch to the tab at `index`, re-seeding from its own data
    pub fn change_tab_index(&mut self, index: usize) -> EngineResult<()> {
        let scope = self
            .scopes
            .get(index)
            .ok_or_else(|| EngineError::invalid_state(format!("no tab at index {}", index)))?;
        let (data, submode) = (scope.data.clone(), scope.submode);

        self.active_tab = index;
        self.seed(data, submode);
        Ok(())
    }

    /// Replace the scopes, e.g. after select options finished loading.
    ///
    /// Current form state is kept.
    pub fn set_scopes(&mut self, scopes: Vec<FormScope>) {
        warn_scope_problems(&scopes);
        self.scopes = scopes;
        if self.active_tab >= self.scopes.len() {
            self.active_tab = 0;
        }
    }

    // ========================================================================
    // Submission
    // ========================================================================

    /// Editing → Submitting, returning the job to run
    pub fn begin_submit(&mut self) -> EngineResult<SubmitJob> {
        match self.phase {
            Phase::Editing => {}
            Phase::Submitting => {
                return Err(EngineError::invalid_state("a submission is already running"));
            }
            other => {
                return Err(EngineError::invalid_state(format!(
                    "cannot submit from {:?}",
                    other
                )));
            }
        }
        let scope = self
            .scope()
            .ok_or_else(|| EngineError::invalid_state("modal has no form"))?;

        let committer = Committer::new(
            self.backend.clone(),
            scope.endpoint.clone(),
            self.submode,
            self.record_id(),
        )
        .with_transform(scope.transform.clone());
        let job = SubmitJob {
            generation: self.generation,
            data: self.form_data.clone(),
            pipeline: scope.pipeline(),
            strategy: scope.strategy.clone(),
            committer,
        };

        self.banner = None;
        self.phase = Phase::Submitting;
        tracing::debug!("Submission started, generation={}", self.generation);
        Ok(job)
    }

    /// Apply a finished submission.
    ///
    /// Authentication failures are returned as errors for the session
    /// collaborator; everything else is reported through the event.
    pub fn complete_submit(&mut self, completion: SubmitCompletion) -> EngineResult<SubmitEvent> {
        if completion.generation != self.generation || self.phase != Phase::Submitting {
            tracing::debug!(
                "Discarding stale submission (job generation {}, current {})",
                completion.generation,
                self.generation
            );
            return Ok(SubmitEvent::Stale);
        }

        match completion.outcome {
            SubmitOutcome::Invalid(errors) => {
                tracing::debug!("Submission blocked by {} field error(s)", errors.len());
                self.errors = errors;
                self.phase = Phase::Editing;
                Ok(SubmitEvent::Invalid)
            }
            SubmitOutcome::Saved(entity) => {
                if let Some(callback) = &self.on_success {
                    callback(&entity);
                }
                if self.submode.closes_on_success() {
                    self.close();
                    return Ok(SubmitEvent::Closed(entity));
                }

                let data = entity.as_object().cloned().unwrap_or_default();
                self.server_data = data.clone();
                self.original_form_data = data.clone();
                self.form_data = data;
                self.errors.clear();
                self.phase = Phase::Viewing;
                Ok(SubmitEvent::Saved(entity))
            }
            SubmitOutcome::Failed(err) => {
                self.phase = Phase::Editing;
                if err.is_auth() {
                    tracing::warn!("Submission rejected: {}", err);
                    return Err(err);
                }
                tracing::error!("Submission failed: {}", err);
                let kind = if err.is_file_processing() {
                    BannerKind::FileProcessing
                } else {
                    BannerKind::Submission
                };
                self.banner = Some(Banner {
                    kind,
                    message: err.user_message(),
                });
                Ok(SubmitEvent::Failed)
            }
        }
    }

    /// Begin, run and complete a submission in one call
    pub async fn submit(&mut self) -> EngineResult<SubmitEvent> {
        let job = self.begin_submit()?;
        let completion = job.run().await;
        self.complete_submit(completion)
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Start deleting the shown entity
    pub fn begin_delete(&mut self) -> EngineResult<DeleteJob> {
        if !matches!(self.phase, Phase::Viewing | Phase::Editing) {
            return Err(EngineError::invalid_state(format!(
                "cannot delete from {:?}",
                self.phase
            )));
        }
        let id = self
            .record_id()
            .ok_or_else(|| EngineError::invalid_state("record has no id"))?;
        let scope = self
            .scope()
            .ok_or_else(|| EngineError::invalid_state("modal has no form"))?;

        Ok(DeleteJob {
            generation: self.generation,
            backend: self.backend.clone(),
            endpoint: scope.endpoint.clone(),
            id,
        })
    }

    /// Apply a finished delete; on success the modal closes and the id is
    /// returned. `None` means the result was stale.
    pub fn complete_delete(
        &mut self,
        completion: DeleteCompletion,
    ) -> EngineResult<Option<RecordId>> {
        if completion.generation != self.generation {
            tracing::debug!("Discarding stale delete of {}", completion.id);
            return Ok(None);
        }

        match completion.result {
            Ok(()) => {
                if let Some(callback) = &self.on_delete {
                    callback(&completion.id);
                }
                self.close();
                Ok(Some(completion.id))
            }
            Err(err) if err.is_auth() => Err(err),
            Err(err) => {
                tracing::error!("Delete failed: {}", err);
                self.banner = Some(Banner {
                    kind: BannerKind::Delete,
                    message: err.user_message(),
                });
                Ok(None)
            }
        }
    }

    /// Begin, run and complete a delete in one call
    pub async fn delete(&mut self) -> EngineResult<Option<RecordId>> {
        let job = self.begin_delete()?;
        let completion = job.run().await;
        self.complete_delete(completion)
    }
}

impl std::fmt::Debug for ModalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalSession")
            .field("phase", &self.phase)
            .field("submode", &self.submode)
            .field("active_tab", &self.active_tab)
            .field("generation", &self.generation)
            .field("errors", &self.errors)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

fn warn_scope_problems(scopes: &[FormScope]) {
    for problem in scope_problems(scopes) {
        tracing::warn!("Invalid form scope {}", problem);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobtrack_client::{FileFieldMapping, InMemoryBackend, PendingUpload};
    use jobtrack_schema::{EntityValidator, FieldDescriptor};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::Cell;
    use tokio_test::block_on;

    fn form(value: Value) -> FormData {
        value.as_object().cloned().unwrap_or_default()
    }

    fn contact_scope() -> FormScope {
        FormScope::new("contact", "contacts").with_form(vec![
            FieldGroup::from(FieldDescriptor::text("name", "Name").required()),
            FieldGroup::row([
                FieldDescriptor::email("email", "Email").required(),
                FieldDescriptor::tel("phone", "Phone"),
            ]),
        ])
    }

    fn seeded_backend() -> Rc<InMemoryBackend> {
        Rc::new(InMemoryBackend::new().with_records(
            "contacts",
            vec![json!({"id": 1, "name": "Jane", "email": "jane@acme.io", "phone": null})],
        ))
    }

    fn jane() -> FormData {
        form(json!({"id": 1, "name": "Jane", "email": "jane@acme.io", "phone": null}))
    }

    #[test]
    fn test_reopen_in_view_is_idempotent() {
        let backend = seeded_backend();
        let mut session = ModalSession::single(backend, contact_scope());

        session.open(Some(jane()), Submode::View);
        let first = (session.form_data().clone(), session.errors().clone());

        session.edit().unwrap();
        session.set_field("name", json!("Janet")).unwrap();
        session.request_close();
        session.open(Some(jane()), Submode::View);

        assert_eq!(
            (session.form_data().clone(), session.errors().clone()),
            first
        );
        assert_eq!(session.phase(), Phase::Viewing);
    }

    #[test]
    fn test_invalid_scope_still_opens() {
        let scope = FormScope::new("contact", "contacts").with_form(vec![
            FieldGroup::from(FieldDescriptor::text("name", "Name")),
            FieldGroup::from(FieldDescriptor::text("name", "Full name")),
        ]);
        assert_eq!(scope_problems(std::slice::from_ref(&scope)).len(), 1);

        let mut session = ModalSession::single(seeded_backend(), scope);
        assert!(session.open(Some(jane()), Submode::View));

        session.set_scopes(vec![contact_scope()]);
        assert!(scope_problems(session.scopes()).is_empty());
    }

    #[test]
    fn test_open_while_open_is_ignored() {
        let mut session = ModalSession::single(seeded_backend(), contact_scope());
        assert!(session.open(Some(jane()), Submode::Edit));
        session.set_field("name", json!("Janet")).unwrap();

        assert!(!session.open(Some(jane()), Submode::Edit));
        assert_eq!(session.form_data()["name"], json!("Janet"));
    }

    #[test]
    fn test_required_field_never_reaches_network() {
        let backend = seeded_backend();
        let mut session = ModalSession::single(backend.clone(), contact_scope());
        session.open(None, Submode::Add);
        session.set_field("name", json!("Jane")).unwrap();
        session.set_field("email", json!("")).unwrap();

        let event = block_on(session.submit()).unwrap();

        assert_eq!(event, SubmitEvent::Invalid);
        assert_eq!(session.errors().get("email"), Some("Email is required"));
        assert_eq!(session.phase(), Phase::Editing);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_set_field_clears_its_error() {
        let mut session = ModalSession::single(seeded_backend(), contact_scope());
        session.open(None, Submode::Add);
        block_on(session.submit()).unwrap();
        assert!(session.errors().contains("name"));
        assert!(session.errors().contains("email"));

        session.set_field("name", json!("J")).unwrap();
        assert!(!session.errors().contains("name"));
        assert!(session.errors().contains("email"));
    }

    #[test]
    fn test_dirty_detection_with_blank_equivalence() {
        let mut session = ModalSession::single(seeded_backend(), contact_scope());
        session.open(Some(jane()), Submode::Edit);
        assert!(!session.has_unsaved_changes());

        session.set_field("phone", json!("")).unwrap();
        assert!(!session.has_unsaved_changes());

        session.set_field("name", json!("Janet")).unwrap();
        assert!(session.has_unsaved_changes());
        assert_eq!(session.changed_fields(), vec!["name"]);

        session.set_field("name", json!("Jane")).unwrap();
        assert!(!session.has_unsaved_changes());
    }

    #[test]
    fn test_add_success_closes_and_notifies_once() {
        let backend = seeded_backend();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut session = ModalSession::single(backend.clone(), contact_scope())
            .with_on_success(move |_| counter.set(counter.get() + 1));

        session.open(None, Submode::Add);
        session.set_field("name", json!("John")).unwrap();
        session.set_field("email", json!("john@acme.io")).unwrap();
        let event = block_on(session.submit()).unwrap();

        match event {
            SubmitEvent::Closed(entity) => assert_eq!(entity["name"], json!("John")),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(session.phase(), Phase::Closed);
        assert_eq!(backend.calls(), vec!["POST contacts/"]);
    }

    #[test]
    fn test_edit_submode_dirty_close_needs_confirmation() {
        let mut session = ModalSession::single(seeded_backend(), contact_scope());

        session.open(Some(jane()), Submode::Edit);
        assert_eq!(session.request_close(), DiscardOutcome::Done);
        assert_eq!(session.phase(), Phase::Closed);

        session.open(Some(jane()), Submode::Edit);
        session.set_field("name", json!("Janet")).unwrap();
        assert_eq!(session.request_close(), DiscardOutcome::NeedsConfirmation);
        assert_eq!(session.phase(), Phase::Editing);
        assert_eq!(session.pending_discard(), Some(DiscardAction::Close));

        session.keep_editing();
        assert_eq!(session.form_data()["name"], json!("Janet"));

        session.request_close();
        session.confirm_discard();
        assert_eq!(session.phase(), Phase::Closed);
    }

    #[test]
    fn test_cancel_edit_restores_server_data() {
        let mut session = ModalSession::single(seeded_backend(), contact_scope());
        session.open(Some(jane()), Submode::View);
        session.edit().unwrap();
        session.set_field("name", json!("Janet")).unwrap();

        assert_eq!(session.cancel_edit().unwrap(), DiscardOutcome::Done);
        assert_eq!(session.phase(), Phase::Viewing);
        assert_eq!(session.form_data(), &jane());
    }

    #[test]
    fn test_cancel_edit_in_edit_submode_asks_first() {
        let mut session = ModalSession::single(seeded_backend(), contact_scope());
        session.open(Some(jane()), Submode::Edit);
        session.set_field("name", json!("Janet")).unwrap();

        assert_eq!(
            session.cancel_edit().unwrap(),
            DiscardOutcome::NeedsConfirmation
        );
        assert_eq!(session.form_data()["name"], json!("Janet"));

        session.confirm_discard();
        assert_eq!(session.phase(), Phase::Viewing);
        assert_eq!(session.form_data()["name"], json!("Jane"));
    }

    #[test]
    fn test_view_edit_save_returns_to_view() {
        let backend = seeded_backend();
        let mut session = ModalSession::single(backend.clone(), contact_scope());
        session.open(Some(jane()), Submode::View);
        session.edit().unwrap();
        session.set_field("phone", json!("+49 30 1234567")).unwrap();

        let event = block_on(session.submit()).unwrap();

        assert!(matches!(event, SubmitEvent::Saved(_)));
        assert_eq!(session.phase(), Phase::Viewing);
        assert_eq!(session.form_data()["phone"], json!("+49 30 1234567"));
        assert_eq!(backend.calls(), vec!["PUT contacts/1"]);
    }

    #[test]
    fn test_concurrent_submit_rejected() {
        let mut session = ModalSession::single(seeded_backend(), contact_scope());
        session.open(Some(jane()), Submode::Edit);

        let _job = session.begin_submit().unwrap();
        assert!(session.is_submitting());
        assert!(session.begin_submit().is_err());
    }

    #[test]
    fn test_stale_submission_after_close_is_discarded() {
        let backend = seeded_backend();
        let mut session = ModalSession::single(backend, contact_scope());
        session.open(Some(jane()), Submode::Edit);
        session.set_field("name", json!("Janet")).unwrap();

        let job = session.begin_submit().unwrap();
        session.close();
        let completion = block_on(job.run());

        assert_eq!(session.complete_submit(completion).unwrap(), SubmitEvent::Stale);
        assert_eq!(session.phase(), Phase::Closed);
        assert!(session.form_data().is_empty());
    }

    #[test]
    fn test_stale_submission_after_tab_change_is_discarded() {
        let backend = seeded_backend();
        let notes = FormScope::new("notes", "notes")
            .with_submode(Submode::Add)
            .with_form(vec![FieldGroup::from(FieldDescriptor::textarea("body", "Note"))]);
        let mut session = ModalSession::new(backend, vec![contact_scope(), notes]);
        session.open(Some(jane()), Submode::Edit);

        let job = session.begin_submit().unwrap();
        session.change_tab("notes").unwrap();
        let completion = block_on(job.run());

        assert_eq!(session.complete_submit(completion).unwrap(), SubmitEvent::Stale);
        assert_eq!(session.active_tab(), 1);
        assert_eq!(session.phase(), Phase::Editing);
        assert_eq!(session.form_data()["body"], Value::Null);
    }

    #[test]
    fn test_backend_failure_sets_banner_and_keeps_data() {
        let backend = seeded_backend();
        backend.fail_next("PUT contacts/1", 400, r#"{"email": ["Already used"]}"#);
        let mut session = ModalSession::single(backend, contact_scope());
        session.open(Some(jane()), Submode::Edit);
        session.set_field("name", json!("Janet")).unwrap();

        let event = block_on(session.submit()).unwrap();

        assert_eq!(event, SubmitEvent::Failed);
        assert_eq!(
            session.banner(),
            Some(&Banner {
                kind: BannerKind::Submission,
                message: "email: Already used".to_string(),
            })
        );
        assert_eq!(session.form_data()["name"], json!("Janet"));
        assert_eq!(session.phase(), Phase::Editing);
    }

    #[test]
    fn test_auth_failure_propagates() {
        let backend = seeded_backend();
        backend.fail_next("PUT contacts/1", 401, "");
        let mut session = ModalSession::single(backend, contact_scope());
        session.open(Some(jane()), Submode::Edit);

        let err = block_on(session.submit()).unwrap_err();
        assert!(err.is_auth());
        assert!(session.errors().is_empty());
        assert!(session.banner().is_none());
        assert_eq!(session.phase(), Phase::Editing);
    }

    #[test]
    fn test_entity_validator_blocks_write() {
        let backend = seeded_backend();
        let scope = contact_scope().with_validator(EntityValidator::sync(|data| {
            let mut errors = FieldErrors::new();
            if data.get("email") == Some(&json!("jane@acme.io")) {
                errors.append("email", "A contact with this email already exists");
            }
            errors
        }));
        let mut session = ModalSession::single(backend.clone(), scope);
        session.open(Some(jane()), Submode::Edit);

        assert_eq!(block_on(session.submit()).unwrap(), SubmitEvent::Invalid);
        assert_eq!(
            session.errors().get("email"),
            Some("A contact with this email already exists")
        );
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_file_removal_and_untouched_file() {
        let backend = Rc::new(InMemoryBackend::new().with_records(
            "applications",
            vec![json!({"id": 3, "role": "Engineer", "cv": 10, "cover_letter": 11})],
        ));
        let scope = FormScope::new("application", "applications")
            .with_form(vec![FieldGroup::row([
                FieldDescriptor::text("role", "Role"),
                FieldDescriptor::file("cv", "CV", &["pdf"]),
                FieldDescriptor::file("cover_letter", "Cover letter", &["pdf"]),
            ])])
            .with_strategy(SubmitStrategy::with_file_fields(vec![
                FileFieldMapping::same("cv"),
                FileFieldMapping::same("cover_letter"),
            ]));
        let mut session = ModalSession::single(backend.clone(), scope);
        session.open(
            Some(form(json!({
                "id": 3,
                "role": "Engineer",
                "cv": {"id": 10, "filename": "cv.pdf"},
                "cover_letter": {"id": 11, "filename": "letter.pdf"}
            }))),
            Submode::Edit,
        );
        session.set_field("cover_letter", Value::Null).unwrap();

        block_on(session.submit()).unwrap();

        let stored = &backend.records("applications")[0];
        assert_eq!(stored["cv"], json!(10));
        assert_eq!(stored["cover_letter"], Value::Null);
        assert_eq!(backend.count_calls("POST files/"), 0);
    }

    #[test]
    fn test_file_failure_sets_distinct_banner() {
        let backend = Rc::new(InMemoryBackend::new());
        backend.fail_next("POST files/", 500, "");
        let scope = FormScope::new("application", "applications")
            .with_form(vec![FieldGroup::from(FieldDescriptor::file("cv", "CV", &["pdf"]))])
            .with_strategy(SubmitStrategy::with_file_fields(vec![FileFieldMapping::same(
                "cv",
            )]));
        let mut session = ModalSession::single(backend.clone(), scope);
        session.open(None, Submode::Add);
        let upload = PendingUpload::from_bytes("cv.pdf", b"%PDF", "application/pdf");
        session.set_field("cv", upload.to_form_value()).unwrap();

        assert_eq!(block_on(session.submit()).unwrap(), SubmitEvent::Failed);
        assert_eq!(
            session.banner().map(|b| b.kind),
            Some(BannerKind::FileProcessing)
        );
        assert_eq!(backend.count_calls("POST applications/"), 0);
    }

    #[test]
    fn test_delete_closes_and_reports_id() {
        let backend = seeded_backend();
        let deleted = Rc::new(Cell::new(None));
        let sink = deleted.clone();
        let mut session = ModalSession::single(backend.clone(), contact_scope())
            .with_on_delete(move |id| sink.set(Some(id.clone())));
        session.open(Some(jane()), Submode::View);

        let id = block_on(session.delete()).unwrap();

        assert_eq!(id, Some(RecordId::Int(1)));
        assert_eq!(deleted.take(), Some(RecordId::Int(1)));
        assert_eq!(session.phase(), Phase::Closed);
        assert!(backend.records("contacts").is_empty());
    }

    #[test]
    fn test_add_seeds_descriptor_defaults() {
        let scope = FormScope::new("application", "applications").with_form(vec![
            FieldGroup::from(FieldDescriptor::text("status", "Status").with_default("applied")),
            FieldGroup::from(FieldDescriptor::checkbox("remote", "Remote")),
        ]);
        let mut session = ModalSession::single(Rc::new(InMemoryBackend::new()), scope);
        session.open(Some(form(json!({"remote": true}))), Submode::Add);

        assert_eq!(session.form_data()["status"], json!("applied"));
        assert_eq!(session.form_data()["remote"], json!(true));
        assert!(session.is_editing());
        assert!(!session.has_unsaved_changes());
    }
}
