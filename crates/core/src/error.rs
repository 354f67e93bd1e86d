//! Error types for Jobtrack
//!
//! This module provides unified error handling across the engine:
//! field and entity validation errors, attachment processing errors,
//! backend/network errors, configuration errors and state errors.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Jobtrack
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Field validation failed
    #[error("Field validation failed for '{field}': {message}")]
    FieldValidation { field: String, message: String },

    /// Duplicate field name within one form
    #[error("Duplicate field name: '{0}' already exists in this form")]
    DuplicateField(String),

    // ========================================================================
    // Attachment Errors
    // ========================================================================
    /// Attachment lookup or upload failed; the entity write was not attempted
    #[error("File processing failed: {0}")]
    FileProcessing(String),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// The backend rejected the request (4xx or 5xx)
    #[error("Backend error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Structured validation detail supplied by the backend, shown verbatim
        detail: Option<String>,
    },

    /// The request never produced a response (connection, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// The backend refused the credentials (401/403)
    #[error("Authentication failed ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The response body could not be understood
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // ========================================================================
    // State Errors
    // ========================================================================
    /// Operation not allowed in the current modal state
    #[error("Invalid modal state: {0}")]
    InvalidState(String),

    /// An async result arrived for a session that has since moved on
    #[error("Operation is no longer current")]
    Stale,

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Operation cancelled by user
    #[error("Operation cancelled")]
    Cancelled,
}

impl EngineError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Create a field validation error
    pub fn field_validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::FieldValidation {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create an attachment processing error
    pub fn file_processing(msg: impl Into<String>) -> Self {
        EngineError::FileProcessing(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        EngineError::InvalidState(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::FieldValidation { .. }
                | EngineError::DuplicateField(_)
        )
    }

    /// Check if this error must be handed to the session/auth collaborator
    pub fn is_auth(&self) -> bool {
        matches!(self, EngineError::Unauthorized { .. })
    }

    /// Check if this error happened while processing attachments
    pub fn is_file_processing(&self) -> bool {
        matches!(self, EngineError::FileProcessing(_))
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
            || matches!(self, EngineError::Api { status: 404, .. })
    }

    /// Message suitable for the modal banner.
    ///
    /// Backend-supplied detail wins over the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            EngineError::Api {
                detail: Some(detail),
                ..
            } => detail.clone(),
            EngineError::Api { status, .. } if *status >= 500 => {
                "The server encountered an error. Please try again.".to_string()
            }
            EngineError::Api { message, .. } => message.clone(),
            EngineError::Network(_) => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            EngineError::Unauthorized { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            EngineError::FileProcessing(msg) => format!("Could not process attachment: {}", msg),
            EngineError::Validation(msg) => msg.clone(),
            EngineError::FieldValidation { message, .. } => message.clone(),
            EngineError::NotFound(_) => "The record no longer exists.".to_string(),
            _ => "An unexpected error occurred. Please try again.".to_string(),
        }
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = EngineError::validation("Name is required");
        assert!(err.is_validation());
        assert!(!err.is_auth());
        assert_eq!(err.to_string(), "Validation error: Name is required");
    }

    #[test]
    fn test_field_validation_error() {
        let err = EngineError::field_validation("email", "Invalid email format");
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Field validation failed for 'email': Invalid email format"
        );
    }

    #[test]
    fn test_backend_detail_preferred() {
        let err = EngineError::Api {
            status: 400,
            message: "Bad Request".to_string(),
            detail: Some("company: this field may not be blank".to_string()),
        };
        assert_eq!(err.user_message(), "company: this field may not be blank");

        let err = EngineError::Api {
            status: 502,
            message: "Bad Gateway".to_string(),
            detail: None,
        };
        assert_eq!(
            err.user_message(),
            "The server encountered an error. Please try again."
        );
    }

    #[test]
    fn test_auth_classification() {
        let err = EngineError::Unauthorized {
            status: 401,
            message: "token expired".to_string(),
        };
        assert!(err.is_auth());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_file_processing_message() {
        let err = EngineError::file_processing("upload rejected");
        assert!(err.is_file_processing());
        assert_eq!(
            err.user_message(),
            "Could not process attachment: upload rejected"
        );
    }

    #[test]
    fn test_not_found_from_status() {
        let err = EngineError::Api {
            status: 404,
            message: "Not Found".to_string(),
            detail: None,
        };
        assert!(err.is_not_found());
    }
}
