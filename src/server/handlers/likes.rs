//! Like toggles and the liked-videos read model

use crate::aggregation::LikedVideo;
use crate::core::auth::Actor;
use crate::core::query::{Page, PageParams};
use crate::core::response::{ApiResponse, ApiResult};
use crate::core::validation::{ParsedQuery, parse_id};
use crate::entities::LikeTarget;
use crate::server::state::AppState;
use axum::extract::{Path, State};
use serde_json::{Value, json};
use uuid::Uuid;

async fn toggle(state: &AppState, actor: &Uuid, target: LikeTarget) -> ApiResult<Value> {
    let liked = state.services.likes.toggle(actor, target).await?;
    let message = if liked {
        format!("Liked {}", target.label())
    } else {
        format!("Unliked {}", target.label())
    };
    Ok(ApiResponse::ok(json!({ "liked": liked }), message))
}

pub async fn toggle_video_like(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(video_id): Path<String>,
) -> ApiResult<Value> {
    let target = LikeTarget::Video(parse_id("videoId", &video_id)?);
    toggle(&state, &actor, target).await
}

pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(comment_id): Path<String>,
) -> ApiResult<Value> {
    let target = LikeTarget::Comment(parse_id("commentId", &comment_id)?);
    toggle(&state, &actor, target).await
}

pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(tweet_id): Path<String>,
) -> ApiResult<Value> {
    let target = LikeTarget::Tweet(parse_id("tweetId", &tweet_id)?);
    toggle(&state, &actor, target).await
}

pub async fn liked_videos(
    State(state): State<AppState>,
    Actor(actor): Actor,
    ParsedQuery(params): ParsedQuery<PageParams>,
) -> ApiResult<Page<LikedVideo>> {
    let page = params.parse()?;
    let videos = state.services.likes.liked_videos(&actor, page).await?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}
