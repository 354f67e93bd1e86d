//! # Jobtrack Client
//!
//! Access to the job tracker REST backend.
//!
//! - **Backend**: the `Backend` trait the engine depends on
//! - **HTTP**: `ApiClient`, the `reqwest` implementation
//! - **Memory**: `InMemoryBackend` for tests and offline use
//! - **Files**: attachment content-addressing and downloads
//! - **Config**: `ClientConfig` loaded from TOML and the environment
//!

pub mod backend;
pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod memory;

pub use backend::{Backend, FILES_ENDPOINT};
pub use config::ClientConfig;
pub use error::ClientError;
pub use files::{
    FileFieldMapping, FileFieldValue, FileRecord, FileStore, PendingUpload, content_key,
    download_file, normalize_content, process_file,
};
pub use http::ApiClient;
pub use memory::InMemoryBackend;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
