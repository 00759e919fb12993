//! Axum extractors reporting rejections through the failure envelope

use crate::core::error::ApiError;
use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Query, Request,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Axum extractor that deserializes and validates a JSON body
///
/// Malformed JSON and validation failures are both reported through the
/// failure envelope as `InvalidArgument`.
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_tweet(
///     Actor(actor): Actor,
///     ValidatedJson(body): ValidatedJson<CreateTweetRequest>,
/// ) -> ApiResult<Tweet> {
///     // body.content is non-blank and at most 280 characters
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    /// Get the inner payload
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload): Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::invalid(format!("Invalid JSON: {}", e.body_text())))?;

        payload.validate()?;
        Ok(ValidatedJson(payload))
    }
}

/// Query-string extractor whose rejection is an `InvalidArgument`
#[derive(Debug, Clone, Default)]
pub struct ParsedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ParsedQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value): Query<T> = Query::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| {
                ApiError::invalid(format!("Invalid query string: {}", e.body_text()))
            })?;
        Ok(ParsedQuery(value))
    }
}
