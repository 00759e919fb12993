//! Scoped staging of uploaded files

use crate::core::error::MediaError;
use std::path::Path;
use tempfile::TempPath;

/// An uploaded file written to local disk
///
/// The file is deleted when the guard drops: after the media upload
/// succeeds, when it fails, and when the request is cancelled.
#[derive(Debug)]
pub struct StagedUpload {
    field: String,
    file_name: Option<String>,
    path: TempPath,
}

impl StagedUpload {
    /// Write `bytes` to a new file under `dir`, keeping the original
    /// extension so media storage can tell the content apart
    pub async fn write(
        dir: &Path,
        field: impl Into<String>,
        file_name: Option<String>,
        bytes: &[u8],
    ) -> Result<Self, MediaError> {
        tokio::fs::create_dir_all(dir).await?;

        let suffix = file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let path = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(dir)?
            .into_temp_path();
        tokio::fs::write(&path, bytes).await?;

        Ok(Self {
            field: field.into(),
            file_name,
            path,
        })
    }

    /// Multipart field the file arrived in
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
