//! # Jobtrack Engine
//!
//! The entity modal state machine and the strategies that commit its
//! form data to the backend.
//!
//! - **Session**: `ModalSession`, the view/edit/submit state machine
//! - **Scope**: `FormScope`, the configuration of one modal tab
//! - **Submit**: `SubmitStrategy`, `Committer` and the attachment-aware strategy
//!

pub mod scope;
pub mod session;
pub mod submit;

pub use scope::{FormScope, scope_problems};
pub use session::{
    Banner, BannerKind, DeleteCompletion, DeleteJob, DiscardAction, DiscardOutcome, ModalSession,
    Phase, SubmitCompletion, SubmitEvent, SubmitJob, SubmitOutcome,
};
pub use submit::{Committed, Committer, SubmitStrategy, Transform, abort};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
