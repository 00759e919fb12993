//! Typed error handling for vidtube
//!
//! Every failure a handler can produce is an [`ApiError`]. The variants form a
//! small, fixed taxonomy and each maps to exactly one HTTP status:
//!
//! | Variant            | Status |
//! |--------------------|--------|
//! | `InvalidArgument`  | 400    |
//! | `Unauthenticated`  | 401    |
//! | `Forbidden`        | 403    |
//! | `NotFound`         | 404    |
//! | `Conflict`         | 409    |
//! | `Upstream`         | 500    |
//!
//! Lower layers have their own error types ([`StoreError`], [`MediaError`])
//! which convert into `ApiError` at the service boundary.
//!
//! # Example
//!
//! ```rust,ignore
//! use vidtube::prelude::*;
//!
//! async fn load(store: Arc<dyn DocumentStore>, id: Uuid) -> Result<Video, ApiError> {
//!     Repository::<Video>::new(store)
//!         .get(&id)
//!         .await?
//!         .ok_or_else(|| ApiError::not_found("Video not found"))
//! }
//! ```

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Message returned to clients for any upstream failure.
///
/// The underlying error is logged, never serialized.
pub const UPSTREAM_MESSAGE: &str = "Something went wrong";

/// The error type returned by services and handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input (bad id, blank content, non-numeric page)
    #[error("{message}")]
    InvalidArgument {
        message: String,
        errors: Vec<FieldError>,
    },

    /// No acting identity on a route that requires one
    #[error("{0}")]
    Unauthenticated(String),

    /// Identity present but not the owner of the resource
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation or lost compare-and-swap
    #[error("{0}")]
    Conflict(String),

    /// The document store or the media storage failed
    #[error("upstream failure: {0}")]
    Upstream(#[from] UpstreamError),
}

/// A single field validation failure, serialized into the `errors` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failures of external collaborators
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// An `InvalidArgument` attributed to a single field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        ApiError::InvalidArgument {
            errors: vec![FieldError::new(field, message.clone())],
            message,
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Upstream(_) => UPSTREAM_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Per-field details, empty for everything but `InvalidArgument`
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ApiError::InvalidArgument { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { collection, .. } => {
                ApiError::Conflict(format!("A matching {} already exists", singular(&collection)))
            }
            other => ApiError::Upstream(UpstreamError::Store(other)),
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(err: MediaError) -> Self {
        ApiError::Upstream(UpstreamError::Media(err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        let message = fields
            .first()
            .map(|f| f.message.clone())
            .unwrap_or_else(|| "Invalid request".to_string());

        ApiError::InvalidArgument {
            message,
            errors: fields,
        }
    }
}

fn singular(collection: &str) -> &str {
    collection.strip_suffix('s').unwrap_or(collection)
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by [`DocumentStore`](crate::storage::DocumentStore) backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write
    #[error("duplicate key in '{collection}' on ({})", .keys.join(", "))]
    DuplicateKey {
        collection: String,
        keys: Vec<String>,
    },

    /// A document could not be converted to or from its typed model
    #[error("failed to (de)serialize document in '{collection}': {message}")]
    Serialization { collection: String, message: String },

    /// The backend rejected or failed the operation
    #[error("{backend} error: {message}")]
    Backend { backend: String, message: String },
}

impl StoreError {
    pub fn backend(backend: &str, message: impl std::fmt::Display) -> Self {
        StoreError::Backend {
            backend: backend.to_string(),
            message: message.to_string(),
        }
    }

    pub fn serialization(collection: &str, message: impl std::fmt::Display) -> Self {
        StoreError::Serialization {
            collection: collection.to_string(),
            message: message.to_string(),
        }
    }
}

// =============================================================================
// Media Errors
// =============================================================================

/// Errors raised by [`MediaStorage`](crate::media::MediaStorage) implementations
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("upload of '{path}' failed: {message}")]
    Upload { path: String, message: String },

    #[error("delete of '{url}' failed: {message}")]
    Delete { url: String, message: String },

    #[error("staging upload failed: {0}")]
    Staging(#[from] std::io::Error),
}
