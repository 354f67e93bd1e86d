//! HTTP client errors
//!
//! `ClientError` describes what went wrong talking to the backend and is
//! converted into [`EngineError`] at the crate boundary.

use jobtrack_core::EngineError;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when making backend requests
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server returned an error response (4xx or 5xx)
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Status line or summary
        message: String,
        /// Validation detail extracted from the response body
        detail: Option<String>,
    },

    /// Failed to deserialise the response body
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Build an `Api` error from a status code and the raw response body
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| extract_detail(&v))
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty() && !trimmed.starts_with('<') && trimmed.len() <= 500)
                    .then(|| trimmed.to_string())
            });

        Self::Api {
            status,
            message: reason
                .map(str::to_string)
                .unwrap_or_else(|| format!("Server returned status {}", status)),
            detail,
        }
    }

    /// Whether this is a "not found" (404) error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Whether this is an "unauthorized" (401) error
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// Whether this is a "forbidden" (403) error
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Api { status: 403, .. })
    }
}

impl From<ClientError> for EngineError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Api {
                status: status @ (401 | 403),
                message,
                detail,
            } => EngineError::Unauthorized {
                status,
                message: detail.unwrap_or(message),
            },
            ClientError::Api {
                status,
                message,
                detail,
            } => EngineError::Api {
                status,
                message,
                detail,
            },
            ClientError::Request(e) if e.is_decode() => EngineError::InvalidResponse(e.to_string()),
            ClientError::Request(e) => EngineError::Network(e.to_string()),
            ClientError::Parse(msg) => EngineError::InvalidResponse(msg),
            ClientError::InvalidRequest(msg) => EngineError::internal(msg),
        }
    }
}

/// Pull a human readable message out of a backend error body.
///
/// Understands `{"detail": "..."}`, `{"message": "..."}`,
/// `{"non_field_errors": [...]}` and field maps like
/// `{"company": ["This field may not be blank."]}`.
pub fn extract_detail(body: &Value) -> Option<String> {
    match body {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(extract_detail).collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        Value::Object(map) => {
            for key in ["detail", "message", "error", "non_field_errors"] {
                if let Some(found) = map.get(key).and_then(extract_detail) {
                    return Some(found);
                }
            }
            let parts: Vec<String> = map
                .iter()
                .filter_map(|(field, v)| extract_detail(v).map(|msg| format!("{}: {}", field, msg)))
                .collect();
            (!parts.is_empty()).then(|| parts.join("\n"))
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
