//! Multipart upload spooling
//!
//! Uploaded images are written to a per-request temporary directory so the
//! detection pipeline can read them from disk. The spooled file keeps the
//! client's file name, which the replay model uses as its manifest key, and
//! is automatically cleaned up when the `SpooledUpload` is dropped.

use axum::extract::Multipart;
use axum::http::StatusCode;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// An uploaded image spooled to a temporary directory
pub struct SpooledUpload {
    /// Filename as supplied by the client
    pub filename: String,
    /// Declared content type
    pub content_type: String,
    /// Path of the spooled file inside the temporary directory
    path: PathBuf,
    /// Directory handle (keeps the file alive until dropped)
    _dir: TempDir,
}

impl SpooledUpload {
    /// Get the on-disk path of the spooled image
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Extract the `file` field from a multipart form and spool it to disk
///
/// Uploads whose content type does not start with `image/` are rejected
/// before any bytes are written.
///
/// # Errors
/// Returns `400 Bad Request` for malformed forms, a missing `file` field,
/// or non-image content types, and `500` when the spool file cannot be
/// created or written.
pub async fn spool_upload(mut multipart: Multipart) -> Result<SpooledUpload, (StatusCode, String)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Invalid multipart form: {e}"),
        )
    })? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();

        if !content_type.starts_with("image/") {
            warn!(
                "Rejected upload {} with content type {:?}",
                filename, content_type
            );
            return Err((
                StatusCode::BAD_REQUEST,
                "File must be an image".to_string(),
            ));
        }

        let bytes = field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read upload: {e}"),
            )
        })?;

        let dir = tempfile::tempdir().map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create temporary directory: {e}"),
            )
        })?;
        let path = dir.path().join(safe_file_name(&filename));

        // Open file for writing
        let mut file = File::create(&path).await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to open temporary file for writing: {e}"),
            )
        })?;

        file.write_all(&bytes).await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to write upload to file: {e}"),
            )
        })?;

        file.flush().await.map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to flush file: {e}"),
            )
        })?;

        debug!(
            "Spooled upload {} ({} bytes) to {}",
            filename,
            bytes.len(),
            path.display()
        );

        return Ok(SpooledUpload {
            filename,
            content_type,
            path,
            _dir: dir,
        });
    }

    Err((
        StatusCode::BAD_REQUEST,
        "Missing multipart field 'file'".to_string(),
    ))
}

/// Strip any path components a client smuggled into the filename
fn safe_file_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
}
