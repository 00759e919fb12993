//! Playlist handlers

use crate::core::auth::Actor;
use crate::core::response::{ApiResponse, ApiResult};
use crate::core::validation::{ValidatedJson, parse_id};
use crate::entities::Playlist;
use crate::server::state::AppState;
use crate::services::{NewPlaylist, PlaylistPatch};
use axum::extract::{Path, State};
use serde_json::{Value, json};

pub async fn create_playlist(
    State(state): State<AppState>,
    Actor(actor): Actor,
    ValidatedJson(body): ValidatedJson<NewPlaylist>,
) -> ApiResult<Playlist> {
    let playlist = state.services.playlists.create(&actor, body).await?;
    Ok(ApiResponse::created(playlist, "Playlist created successfully"))
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> ApiResult<Playlist> {
    let playlist_id = parse_id("playlistId", &playlist_id)?;
    let playlist = state.services.playlists.get(&playlist_id).await?;
    Ok(ApiResponse::ok(playlist, "Playlist fetched successfully"))
}

pub async fn user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Playlist>> {
    let user_id = parse_id("userId", &user_id)?;
    let playlists = state.services.playlists.list_for_user(&user_id).await?;
    Ok(ApiResponse::ok(playlists, "Playlists fetched successfully"))
}

pub async fn update_playlist(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(playlist_id): Path<String>,
    ValidatedJson(body): ValidatedJson<PlaylistPatch>,
) -> ApiResult<Playlist> {
    let playlist_id = parse_id("playlistId", &playlist_id)?;
    let playlist = state
        .services
        .playlists
        .update(&actor, &playlist_id, body)
        .await?;
    Ok(ApiResponse::ok(playlist, "Playlist updated successfully"))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(playlist_id): Path<String>,
) -> ApiResult<Value> {
    let playlist_id = parse_id("playlistId", &playlist_id)?;
    state.services.playlists.delete(&actor, &playlist_id).await?;
    Ok(ApiResponse::ok(json!({}), "Playlist deleted successfully"))
}

pub async fn add_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<Playlist> {
    let video_id = parse_id("videoId", &video_id)?;
    let playlist_id = parse_id("playlistId", &playlist_id)?;

    let playlist = state
        .services
        .playlists
        .add_video(&actor, &playlist_id, &video_id)
        .await?;
    Ok(ApiResponse::ok(playlist, "Video added to playlist"))
}

pub async fn remove_video(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> ApiResult<Playlist> {
    let video_id = parse_id("videoId", &video_id)?;
    let playlist_id = parse_id("playlistId", &playlist_id)?;

    let playlist = state
        .services
        .playlists
        .remove_video(&actor, &playlist_id, &video_id)
        .await?;
    Ok(ApiResponse::ok(playlist, "Video removed from playlist"))
}
