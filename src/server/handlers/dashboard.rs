//! Channel dashboard of the acting user

use crate::aggregation::ChannelStats;
use crate::core::auth::Actor;
use crate::core::query::{Page, PageParams};
use crate::core::response::{ApiResponse, ApiResult};
use crate::core::validation::ParsedQuery;
use crate::entities::Video;
use crate::server::state::AppState;
use axum::extract::State;

pub async fn channel_stats(
    State(state): State<AppState>,
    Actor(actor): Actor,
) -> ApiResult<ChannelStats> {
    let stats = state.services.dashboard.stats(&actor).await?;
    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

pub async fn channel_videos(
    State(state): State<AppState>,
    Actor(actor): Actor,
    ParsedQuery(params): ParsedQuery<PageParams>,
) -> ApiResult<Page<Video>> {
    let page = params.parse()?;
    let videos = state.services.dashboard.channel_videos(&actor, page).await?;
    Ok(ApiResponse::ok(videos, "Channel videos fetched successfully"))
}
