//! Core module containing the traits and types shared by every layer

pub mod auth;
pub mod entity;
pub mod error;
pub mod query;
pub mod response;
pub mod validation;

pub use auth::{Actor, AuthContext, AuthProvider, HeaderAuthProvider, MaybeActor};
pub use entity::{Entity, Owned};
pub use error::{ApiError, FieldError, MediaError, StoreError};
pub use query::{Page, PageParams, PageRequest, PaginationMeta};
pub use response::{ApiResponse, ApiResult};
