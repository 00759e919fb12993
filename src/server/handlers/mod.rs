//! HTTP handlers
//!
//! Handlers parse path ids, query strings and bodies, delegate to the
//! matching service and wrap the result in the response envelope. They hold
//! no business rules of their own.

pub mod comments;
pub mod dashboard;
pub mod health;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

use crate::core::error::ApiError;
use serde::Deserialize;
use validator::Validate;

/// Body of comment and tweet writes
///
/// `content` stays optional so a missing field is reported with the same
/// message as a blank one.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContentBody {
    #[validate(length(max = 10000))]
    pub content: Option<String>,
}

/// Fallback for unmatched routes
pub async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
