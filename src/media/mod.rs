//! Media object storage
//!
//! Uploaded files are first staged on local disk ([`StagedUpload`]), then
//! handed to a [`MediaStorage`] which returns a public URL. Staged files are
//! removed when their guard drops, whatever the outcome of the request.

pub mod local;
pub mod staging;

pub use local::LocalMediaStorage;
pub use staging::StagedUpload;

use crate::core::error::MediaError;
use async_trait::async_trait;
use std::path::Path;

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedMedia {
    /// Public URL of the stored object
    pub url: String,

    /// Playback length in seconds, when the storage can determine it
    pub duration: Option<f64>,
}

/// Object storage collaborator
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store the file at `path` and return its public location
    async fn upload(&self, path: &Path) -> Result<UploadedMedia, MediaError>;

    /// Remove a previously uploaded object by URL
    async fn delete(&self, url: &str) -> Result<(), MediaError>;
}

/// Delete an object, logging instead of failing
///
/// Used for cleanup after the authoritative change has already happened.
pub async fn delete_best_effort(media: &dyn MediaStorage, url: &str) {
    if let Err(e) = media.delete(url).await {
        tracing::warn!(url, error = %e, "failed to delete media object");
    }
}
