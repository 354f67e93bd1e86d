//! In-memory backend
//!
//! Stores records per endpoint in process memory and records every call.
//! Used by tests and for running the UI without a server.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use jobtrack_core::value::value_to_text;
use jobtrack_core::{EngineError, EngineResult, RecordId};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::backend::{
    Backend, FILES_ENDPOINT, clean_endpoint, collection_path, download_path, record_path,
};
use crate::error::ClientError;
use crate::files::normalize_content;

/// Failure injected for the next call matching a prefix
#[derive(Debug, Clone)]
struct Failure {
    prefix: String,
    status: u16,
    body: String,
}

/// Backend keeping all records in memory
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    tables: RefCell<HashMap<String, Vec<Value>>>,
    next_id: Cell<i64>,
    calls: RefCell<Vec<String>>,
    failures: RefCell<Vec<Failure>>,
}

impl InMemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            ..Default::default()
        }
    }

    /// Seed an endpoint with records; numeric ids advance the id counter
    pub fn with_records(self, endpoint: &str, records: Vec<Value>) -> Self {
        for record in &records {
            if let Some(RecordId::Int(n)) = record.get("id").and_then(RecordId::from_value)
                && n >= self.next_id.get()
            {
                self.next_id.set(n + 1);
            }
        }
        self.tables
            .borrow_mut()
            .entry(clean_endpoint(endpoint).to_string())
            .or_default()
            .extend(records);
        self
    }

    /// Make the next call whose description starts with `prefix` fail.
    ///
    /// Call descriptions look like `"POST files/"` or `"PUT applications/3"`.
    pub fn fail_next(&self, prefix: &str, status: u16, body: &str) {
        self.failures.borrow_mut().push(Failure {
            prefix: prefix.to_string(),
            status,
            body: body.to_string(),
        });
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of calls whose description starts with `prefix`
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Forget the call log
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Current records of an endpoint
    pub fn records(&self, endpoint: &str) -> Vec<Value> {
        self.tables
            .borrow()
            .get(clean_endpoint(endpoint))
            .cloned()
            .unwrap_or_default()
    }

    /// Log the call and apply any matching injected failure
    fn enter(&self, call: String) -> EngineResult<()> {
        tracing::debug!("in-memory backend: {}", call);
        let failure = {
            let mut failures = self.failures.borrow_mut();
            failures
                .iter()
                .position(|f| call.starts_with(&f.prefix))
                .map(|i| failures.remove(i))
        };
        self.calls.borrow_mut().push(call);

        match failure {
            Some(f) => Err(ClientError::from_response(f.status, None, &f.body).into()),
            None => Ok(()),
        }
    }

    fn allocate_id(&self) -> i64 {
        let id = self.next_id.get().max(1);
        self.next_id.set(id + 1);
        id
    }

    fn position(&self, endpoint: &str, id: &RecordId) -> Option<usize> {
        self.tables.borrow().get(endpoint).and_then(|rows| {
            rows.iter()
                .position(|r| r.get("id").and_then(RecordId::from_value).as_ref() == Some(id))
        })
    }
}

#[async_trait(?Send)]
impl Backend for InMemoryBackend {
    async fn list(&self, endpoint: &str, query: &[(&str, &str)]) -> EngineResult<Vec<Value>> {
        self.enter(format!("GET {}", collection_path(endpoint)))?;
        Ok(self
            .records(endpoint)
            .into_iter()
            .filter(|row| {
                query
                    .iter()
                    .all(|(key, wanted)| value_to_text(row.get(*key)) == *wanted)
            })
            .collect())
    }

    async fn get(&self, endpoint: &str, id: &RecordId) -> EngineResult<Value> {
        self.enter(format!("GET {}", record_path(endpoint, id)))?;
        let endpoint = clean_endpoint(endpoint);
        let index = self
            .position(endpoint, id)
            .ok_or_else(|| EngineError::NotFound(record_path(endpoint, id)))?;
        Ok(self.tables.borrow()[endpoint][index].clone())
    }

    async fn create(&self, endpoint: &str, body: &Value) -> EngineResult<Value> {
        self.enter(format!("POST {}", collection_path(endpoint)))?;
        let Value::Object(mut record) = body.clone() else {
            return Err(ClientError::from_response(400, None, "expected a JSON object").into());
        };
        record.insert("id".to_string(), Value::from(self.allocate_id()));

        let record = Value::Object(record);
        self.tables
            .borrow_mut()
            .entry(clean_endpoint(endpoint).to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn update(&self, endpoint: &str, id: &RecordId, body: &Value) -> EngineResult<Value> {
        self.enter(format!("PUT {}", record_path(endpoint, id)))?;
        let endpoint = clean_endpoint(endpoint);
        let index = self
            .position(endpoint, id)
            .ok_or_else(|| EngineError::NotFound(record_path(endpoint, id)))?;

        let mut tables = self.tables.borrow_mut();
        let Some(Value::Object(existing)) = tables
            .get_mut(endpoint)
            .and_then(|rows| rows.get_mut(index))
        else {
            return Err(EngineError::internal("stored record is not an object"));
        };
        if let Value::Object(fields) = body {
            for (key, value) in fields {
                existing.insert(key.clone(), value.clone());
            }
        }
        existing.insert("id".to_string(), id.to_value());
        Ok(Value::Object(existing.clone()))
    }

    async fn delete(&self, endpoint: &str, id: &RecordId) -> EngineResult<()> {
        self.enter(format!("DELETE {}", record_path(endpoint, id)))?;
        let endpoint = clean_endpoint(endpoint);
        let index = self
            .position(endpoint, id)
            .ok_or_else(|| EngineError::NotFound(record_path(endpoint, id)))?;
        if let Some(rows) = self.tables.borrow_mut().get_mut(endpoint) {
            rows.remove(index);
        }
        Ok(())
    }

    async fn download_file(&self, id: &RecordId) -> EngineResult<Vec<u8>> {
        self.enter(format!("GET {}", download_path(id)))?;
        let index = self
            .position(FILES_ENDPOINT, id)
            .ok_or_else(|| EngineError::NotFound(record_path(FILES_ENDPOINT, id)))?;
        let content = value_to_text(self.tables.borrow()[FILES_ENDPOINT][index].get("content"));
        STANDARD
            .decode(normalize_content(&content))
            .map_err(|e| EngineError::InvalidResponse(format!("file content is not base64: {}", e)))
    }
}

// ============================================================================
// Tests
// ============================================================================
