//! # vidtube
//!
//! REST backend of a video-sharing platform: videos, comments, likes,
//! subscriptions, tweets, playlists and a per-channel dashboard.
//!
//! ## Layers
//!
//! - **storage**: a [`DocumentStore`](storage::DocumentStore) abstraction over
//!   collections of JSON documents, with an in-memory backend and a MongoDB
//!   backend (feature `mongodb_backend`)
//! - **aggregation**: backend-neutral pipelines building the read models
//!   (video listing, liked videos, subscribers, dashboard stats) and the
//!   pagination executor
//! - **services**: one service per resource, owning validation, ownership
//!   checks and toggle semantics
//! - **server**: axum handlers, routes under `/api/v1` and the
//!   [`ServerBuilder`](server::ServerBuilder)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vidtube::prelude::*;
//!
//! ServerBuilder::new()
//!     .with_store(InMemoryStore::new())
//!     .with_media(LocalMediaStorage::new("./public/media", "http://localhost:8000/media"))
//!     .serve("0.0.0.0:8000")
//!     .await?;
//! ```

pub mod aggregation;
pub mod config;
pub mod core;
pub mod entities;
pub mod media;
pub mod server;
pub mod services;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{Actor, AuthContext, AuthProvider, HeaderAuthProvider, MaybeActor},
        entity::{Entity, Owned},
        error::{ApiError, MediaError, StoreError},
        query::{Page, PageParams, PageRequest},
        response::{ApiResponse, ApiResult},
        validation::{ParsedQuery, ValidatedJson, parse_id},
    };

    // === Macros ===
    pub use crate::impl_entity;

    // === Entities ===
    pub use crate::entities::{Comment, Like, LikeTarget, Playlist, Subscription, Tweet, User, Video};

    // === Storage ===
    pub use crate::storage::{DocumentStore, Filter, InMemoryStore, Pipeline, Repository, Update};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoStore;

    // === Media ===
    pub use crate::media::{LocalMediaStorage, MediaStorage, StagedUpload, UploadedMedia};

    // === Services ===
    pub use crate::services::Services;

    // === Config ===
    pub use crate::config::{AppConfig, DatabaseBackend};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
