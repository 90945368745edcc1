//! Staging of uploaded files on local disk.
//!
//! An uploaded file part is written to a temporary file in the upload
//! directory before being sent to the storage backend. The staged file is
//! removed when the [`StagedUpload`] is dropped, so it never outlives the
//! request regardless of whether the remote upload succeeded.

use axum::extract::multipart::Field;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{StageError, StoreResult};

/// Derives a blob name from the upload time and the original file name.
///
/// The name is the Unix timestamp in milliseconds followed by the original
/// extension, dot included. Files without an extension get the bare timestamp,
/// and so do names ending in a dot (`report.` becomes `<ts>`, not `<ts>.`).
pub fn blob_name(original: &str, now: DateTime<Utc>) -> String {
    let timestamp = now.timestamp_millis();
    match extension(original) {
        Some(ext) => format!("{}.{}", timestamp, ext),
        None => timestamp.to_string(),
    }
}

/// Returns the extension of the last path component, ignoring leading dots.
fn extension(original: &str) -> Option<&str> {
    let file = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let stem_start = file.len() - file.trim_start_matches('.').len();
    let (stem, ext) = file[stem_start..].rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// A file part staged on local disk for the duration of one request.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    blob_name: String,
    original_name: String,
    content_type: String,
    size: u64,
}

impl StagedUpload {
    /// Streams a multipart file field into a new temporary file in `dir`.
    ///
    /// Fails with [`StageError::Form`] when the part cannot be read, which
    /// includes the request exceeding the upload body limit.
    pub async fn from_field(dir: &Path, mut field: Field<'_>) -> Result<Self, StageError> {
        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
        let blob_name = blob_name(&original_name, Utc::now());

        let file = tempfile::Builder::new()
            .prefix(".upload-")
            .suffix(&format!("-{}", blob_name))
            .tempfile_in(dir)?;

        let mut writer = tokio::fs::File::from_std(file.as_file().try_clone()?);

        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;

        debug!(
            "Staged upload {} as {} ({} bytes)",
            original_name,
            file.path().display(),
            size
        );

        Ok(Self {
            file,
            blob_name,
            original_name,
            content_type,
            size,
        })
    }

    /// Reads the staged file back into memory.
    pub async fn read(&self) -> StoreResult<Bytes> {
        Ok(Bytes::from(tokio::fs::read(self.file.path()).await?))
    }

    /// Name the blob will be stored under.
    pub fn blob_name(&self) -> &str {
        &self.blob_name
    }

    /// File name as sent by the client.
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}
