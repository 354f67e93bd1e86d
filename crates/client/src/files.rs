//! Attachment content-addressing
//!
//! Before an entity referencing attachments is written, each pending
//! upload is matched against the stored file records. A record with the
//! same filename and the same normalised content is reused; otherwise a
//! new record is created. Data URLs and plain base64 payloads of the same
//! bytes normalise to the same string.
//!
//! A file field in submitted form data is in one of three states:
//!
//! - `null`: the user removed the attachment; an explicit null id is sent
//! - `{"$upload": {...}}`: a pending upload that must be processed
//! - `{"id": ..}` or a bare id: an attached record, passed through
//!
//! Any failure aborts the submission before the entity write.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use jobtrack_core::value::value_to_text;
use jobtrack_core::{EngineError, EngineResult, FormData, PENDING_UPLOAD_KEY, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::backend::{Backend, FILES_ENDPOINT};

// ============================================================================
// Normalisation
// ============================================================================

/// Strip a `data:<mime>;base64,` prefix, returning the payload
fn strip_data_url(content: &str) -> Option<&str> {
    let rest = content.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    Some(payload)
}

/// Reduce file content to its canonical base64 payload.
///
/// A data URL prefix is stripped; when the payload itself decodes to a
/// data URL, that inner prefix is stripped as well.
pub fn normalize_content(content: &str) -> String {
    let trimmed = content.trim();
    let payload = strip_data_url(trimmed).unwrap_or(trimmed);

    if let Ok(decoded) = STANDARD.decode(payload)
        && let Ok(text) = std::str::from_utf8(&decoded)
        && let Some(inner) = strip_data_url(text.trim())
    {
        return inner.trim().to_string();
    }

    payload.to_string()
}

/// SHA-256 hex digest of the content's bytes.
///
/// Falls back to hashing the payload text when it is not valid base64.
pub fn content_key(content: &str) -> String {
    let normalized = normalize_content(content);
    match STANDARD.decode(&normalized) {
        Ok(bytes) => hex::encode(Sha256::digest(&bytes)),
        Err(_) => hex::encode(Sha256::digest(normalized.as_bytes())),
    }
}

// ============================================================================
// Records
// ============================================================================

/// A stored attachment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: RecordId,

    #[serde(default)]
    pub filename: String,

    /// Base64 or data URL content; may be omitted by list responses
    #[serde(default)]
    pub content: String,

    #[serde(rename = "type", default)]
    pub mime_type: String,

    #[serde(default)]
    pub size: u64,
}

impl FileRecord {
    /// Check if this record holds the given filename and normalised content
    pub fn matches(&self, filename: &str, normalized: &str) -> bool {
        !self.content.is_empty()
            && self.filename == filename
            && normalize_content(&self.content) == normalized
    }
}

/// A file that has been picked but not uploaded yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpload {
    pub filename: String,

    /// Base64 payload or data URL
    pub content: String,

    #[serde(rename = "type", default)]
    pub mime_type: String,

    #[serde(default)]
    pub size: u64,
}

impl PendingUpload {
    /// Create an upload from raw bytes
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: STANDARD.encode(bytes),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
        }
    }

    /// Read a local file, guessing its MIME type from the extension
    pub async fn from_path(path: &Path) -> EngineResult<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| EngineError::FileRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| EngineError::FileRead {
                path: path.to_path_buf(),
                message: "path has no file name".to_string(),
            })?;
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        tracing::debug!("Read {} ({} bytes, {})", filename, bytes.len(), mime);
        Ok(Self::from_bytes(filename, &bytes, mime.essence_str()))
    }

    /// Value stored in form data while the upload is pending
    pub fn to_form_value(&self) -> Value {
        json!({ PENDING_UPLOAD_KEY: self })
    }

    /// Read a pending upload back out of a form value
    pub fn from_form_value(value: &Value) -> Option<Self> {
        value
            .get(PENDING_UPLOAD_KEY)
            .and_then(|inner| serde_json::from_value(inner.clone()).ok())
    }

    /// Canonical base64 payload
    pub fn normalized_content(&self) -> String {
        normalize_content(&self.content)
    }
}

/// Submitted state of a file field
#[derive(Debug, Clone, PartialEq)]
pub enum FileFieldValue {
    /// Attachment explicitly removed
    Removed,
    /// New file waiting to be processed
    Pending(PendingUpload),
    /// Existing record
    Attached(RecordId),
}

impl FileFieldValue {
    /// Classify a submitted file field value
    pub fn from_value(value: &Value) -> EngineResult<Self> {
        match value {
            Value::Null => Ok(FileFieldValue::Removed),
            Value::Object(map) if map.contains_key(PENDING_UPLOAD_KEY) => {
                PendingUpload::from_form_value(value)
                    .map(FileFieldValue::Pending)
                    .ok_or_else(|| EngineError::file_processing("pending upload is malformed"))
            }
            Value::Object(map) => map
                .get("id")
                .and_then(RecordId::from_value)
                .map(FileFieldValue::Attached)
                .ok_or_else(|| EngineError::file_processing("attached file has no id")),
            other => RecordId::from_value(other)
                .map(FileFieldValue::Attached)
                .ok_or_else(|| {
                    EngineError::file_processing(format!(
                        "unrecognised file value '{}'",
                        value_to_text(Some(other))
                    ))
                }),
        }
    }
}

/// Maps a form file field to the attribute the backend expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFieldMapping {
    /// Field name in form data
    pub field: String,
    /// Attribute written to the backend (often `<field>_id`)
    pub target: String,
}

impl FileFieldMapping {
    /// Keep the same attribute name
    pub fn same(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            target: field.clone(),
            field,
        }
    }

    /// Write the id under a different attribute name
    pub fn renamed(field: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            target: target.into(),
        }
    }
}

// ============================================================================
// FileStore
// ============================================================================

/// Processes pending uploads against one backend.
///
/// The list of stored records is fetched on first use and kept for the
/// lifetime of the store; records created through the store are added to
/// it, so equal uploads within one submission share a record.
pub struct FileStore<'a> {
    backend: &'a dyn Backend,
    known: Option<Vec<FileRecord>>,
}

impl<'a> FileStore<'a> {
    /// Create a store over a backend
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            known: None,
        }
    }

    async fn known_records(&mut self) -> EngineResult<&mut Vec<FileRecord>> {
        if self.known.is_none() {
            let rows = self
                .backend
                .list(FILES_ENDPOINT, &[])
                .await
                .map_err(file_error)?;
            let records = rows
                .into_iter()
                .filter_map(|row| serde_json::from_value::<FileRecord>(row).ok())
                .collect();
            self.known = Some(records);
        }
        Ok(self.known.get_or_insert_with(Vec::new))
    }

    /// Process a form value.
    ///
    /// Returns `None` when the value is not a pending upload, otherwise the
    /// id of the reused or newly created record.
    pub async fn process_file(&mut self, input: &Value) -> EngineResult<Option<RecordId>> {
        match PendingUpload::from_form_value(input) {
            Some(upload) => self.upload(&upload).await.map(Some),
            None => Ok(None),
        }
    }

    /// Reuse a stored record with the same filename and content, or create one
    pub async fn upload(&mut self, upload: &PendingUpload) -> EngineResult<RecordId> {
        let normalized = upload.normalized_content();
        if normalized.is_empty() {
            return Err(EngineError::file_processing(format!(
                "{} is empty",
                upload.filename
            )));
        }

        let backend = self.backend;
        let known = self.known_records().await?;
        if let Some(existing) = known
            .iter()
            .find(|r| r.matches(&upload.filename, &normalized))
        {
            tracing::info!(
                "Reusing stored file {} for {} ({})",
                existing.id,
                upload.filename,
                content_key(&normalized)
            );
            return Ok(existing.id.clone());
        }

        let size = STANDARD
            .decode(&normalized)
            .map(|b| b.len() as u64)
            .unwrap_or(upload.size);
        let body = json!({
            "filename": upload.filename,
            "content": normalized,
            "type": upload.mime_type,
            "size": size,
        });
        let created = backend
            .create(FILES_ENDPOINT, &body)
            .await
            .map_err(file_error)?;
        let id = created
            .get("id")
            .and_then(RecordId::from_value)
            .ok_or_else(|| EngineError::file_processing("file record created without an id"))?;

        tracing::info!("Stored new file {} as {}", upload.filename, id);
        known.push(FileRecord {
            id: id.clone(),
            filename: upload.filename.clone(),
            content: normalized,
            mime_type: upload.mime_type.clone(),
            size,
        });
        Ok(id)
    }

    /// Replace every mapped file field in `data` by the id it resolves to.
    ///
    /// Absent fields are left out, `null` stays an explicit null, pending
    /// uploads are processed and attached records collapse to their id.
    pub async fn resolve_file_fields(
        &mut self,
        data: &mut FormData,
        mappings: &[FileFieldMapping],
    ) -> EngineResult<()> {
        for mapping in mappings {
            let Some(value) = data.remove(&mapping.field) else {
                continue;
            };

            let resolved = match FileFieldValue::from_value(&value)? {
                FileFieldValue::Removed => Value::Null,
                FileFieldValue::Attached(id) => id.to_value(),
                FileFieldValue::Pending(upload) => self.upload(&upload).await?.to_value(),
            };
            data.insert(mapping.target.clone(), resolved);
        }
        Ok(())
    }
}

/// Process a single form value with a fresh store
pub async fn process_file(backend: &dyn Backend, input: &Value) -> EngineResult<Option<RecordId>> {
    FileStore::new(backend).process_file(input).await
}

/// Download a stored file into `dir` under its own filename.
///
/// Returns the path written.
pub async fn download_file(
    backend: &dyn Backend,
    record: &FileRecord,
    dir: &Path,
) -> EngineResult<PathBuf> {
    let bytes = backend.download_file(&record.id).await?;
    let name = Path::new(&record.filename)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| format!("file-{}", record.id).into());
    let path = dir.join(name);

    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| EngineError::FileWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
    tracing::info!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Keep auth failures as they are; everything else aborts as a file error
fn file_error(err: EngineError) -> EngineError {
    if err.is_auth() || err.is_file_processing() {
        err
    } else {
        tracing::warn!("File processing failed: {}", err);
        EngineError::file_processing(err.user_message())
    }
}

// ============================================================================
// Tests
// ============================================================================
