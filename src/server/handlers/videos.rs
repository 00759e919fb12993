//! Video handlers
//!
//! Publish and update arrive as `multipart/form-data`. File parts are staged
//! to disk before the service runs; the staged files are removed when the
//! form drops at the end of the request.

use crate::aggregation::{VideoDetail, VideoList, VideoQuery};
use crate::core::auth::{Actor, MaybeActor};
use crate::core::error::ApiError;
use crate::core::query::PageParams;
use crate::core::response::{ApiResponse, ApiResult};
use crate::core::validation::{ParsedQuery, parse_id};
use crate::entities::Video;
use crate::media::StagedUpload;
use crate::server::state::AppState;
use crate::services::{PublishVideo, VideoPatch};
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use serde::Deserialize;
use serde_json::Value;

const VIDEO_FILE_FIELD: &str = "videoFile";
const THUMBNAIL_FIELD: &str = "thumbnail";

/// Query string of `GET /videos`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    pub user_id: Option<String>,
}

/// Parts of a video form, text fields as sent and files staged on disk
#[derive(Debug, Default)]
struct VideoForm {
    title: Option<String>,
    description: Option<String>,
    video_file: Option<StagedUpload>,
    thumbnail: Option<StagedUpload>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::invalid(format!("Invalid multipart body: {}", err.body_text()))
}

async fn read_video_form(
    mut multipart: Multipart,
    state: &AppState,
) -> Result<VideoForm, ApiError> {
    let mut form = VideoForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
            "description" => form.description = Some(field.text().await.map_err(multipart_error)?),
            VIDEO_FILE_FIELD | THUMBNAIL_FIELD => {
                let file_name = field.file_name().map(String::from);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Browsers send an empty part for an untouched file input
                if bytes.is_empty() {
                    continue;
                }

                let staged =
                    StagedUpload::write(state.staging_dir(), name.as_str(), file_name, &bytes)
                        .await?;
                if name == VIDEO_FILE_FIELD {
                    form.video_file = Some(staged);
                } else {
                    form.thumbnail = Some(staged);
                }
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    Ok(form)
}

pub async fn list_videos(
    State(state): State<AppState>,
    ParsedQuery(params): ParsedQuery<VideoListParams>,
) -> ApiResult<VideoList> {
    let page = PageParams::new(params.page.as_deref(), params.limit.as_deref()).parse()?;
    let query = VideoQuery::parse(
        params.user_id.as_deref(),
        params.query.as_deref(),
        params.sort_by.as_deref(),
        params.sort_type.as_deref(),
    )?;

    let videos = state.services.videos.list(&query, page).await?;
    Ok(ApiResponse::ok(videos, "Videos fetched successfully"))
}

pub async fn publish_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    multipart: Multipart,
) -> ApiResult<Video> {
    let form = read_video_form(multipart, &state).await?;

    let video = state
        .services
        .videos
        .publish(
            &actor,
            PublishVideo {
                title: form.title,
                description: form.description,
                video_file: form.video_file.as_ref(),
                thumbnail: form.thumbnail.as_ref(),
            },
        )
        .await?;

    Ok(ApiResponse::created(video, "Video published successfully"))
}

pub async fn get_video(
    State(state): State<AppState>,
    MaybeActor(viewer): MaybeActor,
    Path(video_id): Path<String>,
) -> ApiResult<VideoDetail> {
    let video_id = parse_id("videoId", &video_id)?;
    let video = state
        .services
        .videos
        .view(viewer.as_ref(), &video_id)
        .await?;
    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

pub async fn update_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Video> {
    let video_id = parse_id("videoId", &video_id)?;
    let form = read_video_form(multipart, &state).await?;

    let video = state
        .services
        .videos
        .update(
            &actor,
            &video_id,
            VideoPatch {
                title: form.title,
                description: form.description,
                thumbnail: form.thumbnail.as_ref(),
            },
        )
        .await?;

    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(video_id): Path<String>,
) -> ApiResult<Value> {
    let video_id = parse_id("videoId", &video_id)?;
    state.services.videos.delete(&actor, &video_id).await?;
    Ok(ApiResponse::ok(Value::Null, "Video deleted successfully"))
}

pub async fn toggle_publish(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(video_id): Path<String>,
) -> ApiResult<Video> {
    let video_id = parse_id("videoId", &video_id)?;
    let video = state
        .services
        .videos
        .toggle_publish(&actor, &video_id)
        .await?;
    Ok(ApiResponse::ok(video, "Publish status toggled successfully"))
}
