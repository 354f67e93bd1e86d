//! Backend seam
//!
//! The engine talks to the REST backend only through [`Backend`], so the
//! HTTP client can be swapped for the in-memory implementation in tests.

use async_trait::async_trait;
use jobtrack_core::{EngineResult, RecordId};
use serde_json::Value;

/// Endpoint that stores attachment records
pub const FILES_ENDPOINT: &str = "files";

/// CRUD access to the REST backend.
///
/// Endpoints are given without surrounding slashes (`"applications"`).
#[async_trait(?Send)]
pub trait Backend {
    /// `GET <endpoint>/` with optional query filters
    async fn list(&self, endpoint: &str, query: &[(&str, &str)]) -> EngineResult<Vec<Value>>;

    /// `GET <endpoint>/<id>`
    async fn get(&self, endpoint: &str, id: &RecordId) -> EngineResult<Value>;

    /// `POST <endpoint>/`
    async fn create(&self, endpoint: &str, body: &Value) -> EngineResult<Value>;

    /// `PUT <endpoint>/<id>`
    async fn update(&self, endpoint: &str, id: &RecordId, body: &Value) -> EngineResult<Value>;

    /// `DELETE <endpoint>/<id>`
    async fn delete(&self, endpoint: &str, id: &RecordId) -> EngineResult<()>;

    /// `GET files/<id>/download`
    async fn download_file(&self, id: &RecordId) -> EngineResult<Vec<u8>>;
}

/// Strip surrounding slashes from an endpoint name
pub fn clean_endpoint(endpoint: &str) -> &str {
    endpoint.trim_matches('/')
}

/// Path of the collection resource (`applications/`)
pub fn collection_path(endpoint: &str) -> String {
    format!("{}/", clean_endpoint(endpoint))
}

/// Path of a single record (`applications/7`)
pub fn record_path(endpoint: &str, id: &RecordId) -> String {
    format!("{}/{}", clean_endpoint(endpoint), id)
}

/// Path of a file's binary content (`files/7/download`)
pub fn download_path(id: &RecordId) -> String {
    format!("{}/{}/download", FILES_ENDPOINT, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(collection_path("/applications/"), "applications/");
        assert_eq!(record_path("companies", &RecordId::Int(3)), "companies/3");
        assert_eq!(download_path(&RecordId::from("ab")), "files/ab/download");
    }
}
