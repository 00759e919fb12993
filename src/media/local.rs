//! Filesystem-backed media storage for development and tests

use super::{MediaStorage, UploadedMedia};
use crate::core::error::MediaError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Copies uploads into `root` and serves them under `base_url`
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Object name for a URL issued by this storage
    fn object_name<'a>(&self, url: &'a str) -> Option<&'a str> {
        let name = url.strip_prefix(&self.base_url)?.strip_prefix('/')?;
        let valid = !name.is_empty() && !name.contains('/') && !name.contains("..");
        valid.then_some(name)
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn upload(&self, path: &Path) -> Result<UploadedMedia, MediaError> {
        let upload_error = |message: String| MediaError::Upload {
            path: path.display().to_string(),
            message,
        };

        let name = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| upload_error(e.to_string()))?;
        tokio::fs::copy(path, self.root.join(&name))
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        let url = format!("{}/{}", self.base_url, name);
        tracing::debug!(url = %url, "stored media object");

        Ok(UploadedMedia {
            url,
            duration: None,
        })
    }

    async fn delete(&self, url: &str) -> Result<(), MediaError> {
        let name = self.object_name(url).ok_or_else(|| MediaError::Delete {
            url: url.to_string(),
            message: "not an object of this storage".to_string(),
        })?;

        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(url, "media object already absent");
                Ok(())
            }
            Err(e) => Err(MediaError::Delete {
                url: url.to_string(),
                message: e.to_string(),
            }),
        }
    }
}
