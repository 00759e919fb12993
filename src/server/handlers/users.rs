//! User handlers

use crate::aggregation::VideoCard;
use crate::core::auth::Actor;
use crate::core::response::{ApiResponse, ApiResult};
use crate::core::validation::{ValidatedJson, parse_id};
use crate::entities::User;
use crate::server::state::AppState;
use crate::services::NewUser;
use axum::extract::{Path, State};

pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<NewUser>,
) -> ApiResult<User> {
    let user = state.services.users.register(body).await?;
    Ok(ApiResponse::created(user, "User registered successfully"))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<User> {
    let user_id = parse_id("userId", &user_id)?;
    let user = state.services.users.get(&user_id).await?;
    Ok(ApiResponse::ok(user, "User fetched successfully"))
}

/// The acting user's watch history, most recent first
pub async fn watch_history(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> ApiResult<Vec<VideoCard>> {
    let history = state.services.users.watch_history(&actor).await?;
    Ok(ApiResponse::ok(history, "Watch history fetched successfully"))
}
