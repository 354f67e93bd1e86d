//! File Operations for Jobtrack
//!
//! Native file dialogs (via `rfd`) for attaching documents to a form and
//! saving downloaded attachments. A dismissed dialog is reported as
//! `EngineError::Cancelled`.

use jobtrack_client::{Backend, FileRecord, PendingUpload, download_file};
use jobtrack_core::{EngineError, EngineResult, RecordId};
use rfd::AsyncFileDialog;
use std::path::{Path, PathBuf};

/// Display name for the attachment file filter
pub const FILE_TYPE_NAME: &str = "Documents";

// ============================================================================
// File Dialog Functions
// ============================================================================

/// Open a file dialog limited to the accepted extensions
///
/// Returns the selected file path, or None if the dialog was cancelled.
pub async fn show_attachment_dialog(accept: &[String]) -> Option<PathBuf> {
    let mut dialog = AsyncFileDialog::new().set_title("Attach File");

    let extensions: Vec<&str> = accept
        .iter()
        .map(|ext| ext.trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .collect();
    if !extensions.is_empty() {
        dialog = dialog.add_filter(FILE_TYPE_NAME, &extensions);
    }

    let file = dialog.add_filter("All Files", &["*"]).pick_file().await?;
    Some(file.path().to_path_buf())
}

/// Open a file dialog to select where downloads go
///
/// Returns the selected directory path, or None if the dialog was cancelled.
pub async fn show_download_directory_dialog() -> Option<PathBuf> {
    let folder = AsyncFileDialog::new()
        .set_title("Save Attachment To")
        .pick_folder()
        .await?;

    Some(folder.path().to_path_buf())
}

// ============================================================================
// Attachment Operations
// ============================================================================

/// Let the user pick a file and read it as a pending upload
pub async fn pick_attachment(accept: &[String]) -> EngineResult<PendingUpload> {
    let path = show_attachment_dialog(accept)
        .await
        .ok_or(EngineError::Cancelled)?;

    if !is_accepted(&path, accept) {
        return Err(EngineError::validation(format!(
            "{} is not one of: {}",
            display_name(&path),
            accept.join(", ")
        )));
    }

    tracing::debug!("Reading attachment {}", path.display());
    PendingUpload::from_path(&path).await
}

/// Download a stored attachment into a user-chosen directory
pub async fn save_attachment(
    backend: &dyn Backend,
    id: &RecordId,
    filename: &str,
) -> EngineResult<PathBuf> {
    let dir = show_download_directory_dialog()
        .await
        .ok_or(EngineError::Cancelled)?;

    let record = FileRecord {
        id: id.clone(),
        filename: filename.to_string(),
        content: String::new(),
        mime_type: String::new(),
        size: 0,
    };
    download_file(backend, &record, &dir).await
}

// ============================================================================
// Path Helpers
// ============================================================================

/// Whether the path's extension is in the accept list (empty list accepts all)
pub fn is_accepted(path: &Path, accept: &[String]) -> bool {
    if accept.is_empty() {
        return true;
    }
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    accept
        .iter()
        .any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Get the display name of a file (file name with extension)
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_accepted() {
        let docs = accept(&["pdf", ".docx"]);
        assert!(is_accepted(Path::new("/tmp/cv.pdf"), &docs));
        assert!(is_accepted(Path::new("/tmp/CV.PDF"), &docs));
        assert!(is_accepted(Path::new("letter.docx"), &docs));
        assert!(!is_accepted(Path::new("photo.png"), &docs));
        assert!(!is_accepted(Path::new("README"), &docs));
    }

    #[test]
    fn test_empty_accept_list_allows_anything() {
        assert!(is_accepted(Path::new("anything.bin"), &[]));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/home/user/cv.pdf")), "cv.pdf");
        assert_eq!(display_name(Path::new("/")), "file");
    }
}
