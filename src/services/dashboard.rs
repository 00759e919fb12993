//! Channel dashboard
//!
//! Each total is its own aggregation; a missing result row means zero.
//! Likes are counted by joining every like to its video on each request.

use super::videos::VideoService;
use crate::aggregation::{self, ChannelStats};
use crate::core::entity::Entity;
use crate::core::error::ApiError;
use crate::core::query::{Page, PageRequest};
use crate::entities::{Like, Subscription, Video};
use crate::storage::DocumentStore;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

fn first_row_number(rows: &[Value], field: &str) -> Option<i64> {
    rows.first()
        .and_then(|row| row.get(field))
        .and_then(|value| value.as_i64().or_else(|| value.as_f64().map(|f| f as i64)))
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn DocumentStore>,
    videos: VideoService,
}

impl DashboardService {
    pub fn new(store: Arc<dyn DocumentStore>, videos: VideoService) -> Self {
        Self { store, videos }
    }

    pub async fn stats(&self, channel: &Uuid) -> Result<ChannelStats, ApiError> {
        let video_rows = self
            .store
            .aggregate(Video::resource_name(), &aggregation::channel_video_stats(channel))
            .await?;
        let like_rows = self
            .store
            .aggregate(Like::resource_name(), &aggregation::channel_like_stats(channel))
            .await?;
        let subscriber_rows = self
            .store
            .aggregate(
                Subscription::resource_name(),
                &aggregation::channel_subscriber_stats(channel),
            )
            .await?;

        let count =
            |rows: &[Value], field: &str| first_row_number(rows, field).unwrap_or(0).max(0) as u64;

        Ok(ChannelStats {
            total_videos: count(&video_rows, "totalVideos"),
            total_views: first_row_number(&video_rows, "totalViews").unwrap_or(0),
            total_likes: count(&like_rows, "totalLikes"),
            total_subscribers: count(&subscriber_rows, "totalSubscribers"),
        })
    }

    /// The channel's published videos, newest first
    pub async fn channel_videos(
        &self,
        channel: &Uuid,
        page: PageRequest,
    ) -> Result<Page<Video>, ApiError> {
        self.videos.channel_videos(channel, page).await
    }
}
