//! Shared state handed to every handler

use crate::services::Services;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application state
///
/// Cloned per request by axum, so everything behind it is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    staging_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(services: Services, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            services,
            staging_dir: Arc::new(staging_dir.into()),
        }
    }

    /// Where multipart file parts are written while a request is in flight
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }
}
