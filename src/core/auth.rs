//! Request identity
//!
//! Authentication itself happens upstream (an API gateway or session
//! service). This module only turns whatever the upstream attached to the
//! request into an [`AuthContext`], stores it in the request extensions, and
//! offers extractors for handlers:
//!
//! - [`Actor`]: the acting user id, or `401 Unauthenticated`
//! - [`MaybeActor`]: the acting user id when present

use super::error::ApiError;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use uuid::Uuid;

/// Header set by the upstream gateway once it has authenticated the caller
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: Uuid },

    /// No identity supplied
    Anonymous,

    /// Identity supplied but unusable (malformed header)
    Invalid { reason: String },
}

impl AuthContext {
    /// Get user_id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id } => Some(*user_id),
            _ => None,
        }
    }

    /// Check whether the acting user owns a resource
    pub fn owns(&self, owner: &Uuid) -> bool {
        self.user_id().is_some_and(|id| &id == owner)
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from HTTP request headers
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext>;
}

/// Trusts the `x-user-id` header set by an upstream gateway
#[derive(Debug, Clone, Default)]
pub struct HeaderAuthProvider;

#[async_trait]
impl AuthProvider for HeaderAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext> {
        let Some(raw) = headers.get(USER_ID_HEADER) else {
            return Ok(AuthContext::Anonymous);
        };

        let raw = raw
            .to_str()
            .map_err(|_| anyhow!("{} header is not valid ASCII", USER_ID_HEADER))?;

        match Uuid::parse_str(raw.trim()) {
            Ok(user_id) => Ok(AuthContext::User { user_id }),
            Err(_) => Ok(AuthContext::Invalid {
                reason: format!("{} header is not a valid user id", USER_ID_HEADER),
            }),
        }
    }
}

/// Middleware resolving the request identity once, before any handler runs
pub async fn authenticate(
    State(provider): State<Arc<dyn AuthProvider>>,
    mut request: Request,
    next: Next,
) -> Response {
    let context = match provider.extract_context(request.headers()).await {
        Ok(context) => context,
        Err(e) => AuthContext::Invalid {
            reason: e.to_string(),
        },
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

fn context_from_parts(parts: &Parts) -> AuthContext {
    parts
        .extensions
        .get::<AuthContext>()
        .cloned()
        .unwrap_or(AuthContext::Anonymous)
}

/// The acting user; rejects with `Unauthenticated` when absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match context_from_parts(parts) {
            AuthContext::User { user_id } => Ok(Actor(user_id)),
            AuthContext::Invalid { reason } => Err(ApiError::unauthenticated(reason)),
            AuthContext::Anonymous => Err(ApiError::unauthenticated("Unauthorized request")),
        }
    }
}

/// The acting user when one is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaybeActor(pub Option<Uuid>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match context_from_parts(parts) {
            AuthContext::User { user_id } => Ok(MaybeActor(Some(user_id))),
            AuthContext::Invalid { reason } => Err(ApiError::unauthenticated(reason)),
            AuthContext::Anonymous => Ok(MaybeActor(None)),
        }
    }
}
