//! Comment handlers

use super::ContentBody;
use crate::aggregation::CommentView;
use crate::core::auth::{Actor, MaybeActor};
use crate::core::query::{Page, PageParams};
use crate::core::response::{ApiResponse, ApiResult};
use crate::core::validation::{ParsedQuery, ValidatedJson, parse_id};
use crate::entities::Comment;
use crate::server::state::AppState;
use axum::extract::{Path, State};
use serde_json::{Value, json};

pub async fn list_comments(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Path(video_id): Path<String>,
    ParsedQuery(params): ParsedQuery<PageParams>,
) -> ApiResult<Page<CommentView>> {
    let video_id = parse_id("videoId", &video_id)?;
    let page = params.parse()?;

    let comments = state
        .services
        .comments
        .list(viewer.as_ref(), &video_id, page)
        .await?;
    Ok(ApiResponse::ok(comments, "Comments fetched successfully"))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(video_id): Path<String>,
    ValidatedJson(body): ValidatedJson<ContentBody>,
) -> ApiResult<CommentView> {
    let video_id = parse_id("videoId", &video_id)?;
    let comment = state
        .services
        .comments
        .add(&actor, &video_id, body.content.as_deref())
        .await?;
    Ok(ApiResponse::created(comment, "Comment added successfully"))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(comment_id): Path<String>,
    ValidatedJson(body): ValidatedJson<ContentBody>,
) -> ApiResult<Comment> {
    let comment_id = parse_id("commentId", &comment_id)?;
    let comment = state
        .services
        .comments
        .update(&actor, &comment_id, body.content.as_deref())
        .await?;
    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(comment_id): Path<String>,
) -> ApiResult<Value> {
    let comment_id = parse_id("commentId", &comment_id)?;
    state.services.comments.delete(&actor, &comment_id).await?;
    Ok(ApiResponse::ok(json!({}), "Comment deleted successfully"))
}
