//! Read-model aggregation builders
//!
//! Each builder is a pure function producing a [`Pipeline`] with the same
//! shape: filter, join one related collection, flatten the join, sort with
//! an `id` tie-break, then project a whitelist of fields. Rows whose joined
//! document no longer exists are dropped by the flatten step.

pub mod paginate;
pub mod views;

pub use paginate::{count_rows, paginate};
pub use views::{
    ChannelStats, ChannelSummary, CommentView, LikedVideo, OwnerSummary, TweetView, VideoCard,
    VideoDetail, VideoList,
};

use crate::core::error::ApiError;
use crate::storage::{Accumulator, Filter, Pipeline, Projection, SortDirection, SortKey};
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

/// Fields a video listing may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSortField {
    #[default]
    CreatedAt,
    Views,
    Duration,
    Title,
}

impl VideoSortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "createdAt" => Some(VideoSortField::CreatedAt),
            "views" => Some(VideoSortField::Views),
            "duration" => Some(VideoSortField::Duration),
            "title" => Some(VideoSortField::Title),
            _ => None,
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            VideoSortField::CreatedAt => "createdAt",
            VideoSortField::Views => "views",
            VideoSortField::Duration => "duration",
            VideoSortField::Title => "title",
        }
    }
}

/// Validated parameters of the public video listing
#[derive(Debug, Clone, PartialEq)]
pub struct VideoQuery {
    pub owner: Option<Uuid>,
    pub text: Option<String>,
    pub sort_by: VideoSortField,
    pub direction: SortDirection,
}

impl Default for VideoQuery {
    fn default() -> Self {
        Self {
            owner: None,
            text: None,
            sort_by: VideoSortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

/// A trimmed query-string value, `None` when absent or blank
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

impl VideoQuery {
    /// Parse raw query-string values; blank values fall back to defaults
    pub fn parse(
        owner: Option<&str>,
        text: Option<&str>,
        sort_by: Option<&str>,
        sort_type: Option<&str>,
    ) -> Result<Self, ApiError> {
        let owner = present(owner)
            .map(|raw| crate::core::validation::parse_id("userId", raw))
            .transpose()?;

        let sort_by = match present(sort_by) {
            Some(raw) => VideoSortField::parse(raw).ok_or_else(|| {
                ApiError::invalid_field(
                    "sortBy",
                    "sortBy must be one of createdAt, views, duration, title",
                )
            })?,
            None => VideoSortField::default(),
        };

        let direction = match present(sort_type) {
            Some(raw) => SortDirection::parse(raw).ok_or_else(|| {
                ApiError::invalid_field("sortType", "sortType must be asc or desc")
            })?,
            None => SortDirection::Desc,
        };

        Ok(Self {
            owner,
            text: present(text).map(String::from),
            sort_by,
            direction,
        })
    }
}

fn owner_summary() -> Projection {
    Projection::new().include_all(&["id", "username", "avatar"])
}

fn published() -> Filter {
    Filter::eq("isPublished", true)
}

/// Published videos, optionally restricted to one owner and a text search
/// over title or description
pub fn video_listing(query: &VideoQuery) -> Pipeline {
    let mut predicates = vec![published()];

    if let Some(owner) = &query.owner {
        predicates.push(Filter::id_eq("owner", owner));
    }

    if let Some(text) = &query.text {
        predicates.push(Filter::or([
            Filter::contains("title", text.as_str()),
            Filter::contains("description", text.as_str()),
        ]));
    }

    Pipeline::new()
        .matching(Filter::and(predicates))
        .join_one("users", "owner", "owner")
        .sort(SortKey::with_tie_break(query.sort_by.field(), query.direction))
        .project(video_card())
}

fn video_card() -> Projection {
    Projection::new()
        .include_all(&[
            "id",
            "title",
            "description",
            "videoFile",
            "thumbnail",
            "duration",
            "views",
            "createdAt",
        ])
        .nested("owner", owner_summary())
}

/// One video with its owner expanded
pub fn video_detail(video: &Uuid) -> Pipeline {
    Pipeline::new()
        .matching(Filter::by_id(video))
        .join_one("users", "owner", "owner")
        .project(
            Projection::new()
                .include_all(&[
                    "id",
                    "title",
                    "description",
                    "videoFile",
                    "thumbnail",
                    "duration",
                    "views",
                    "isPublished",
                    "createdAt",
                    "updatedAt",
                ])
                .nested("owner", owner_summary()),
        )
}

/// Published videos among `ids`, as listing cards (order is not preserved)
pub fn videos_by_ids(ids: &[Uuid]) -> Pipeline {
    Pipeline::new()
        .matching(Filter::and([Filter::id_in("id", ids), published()]))
        .join_one("users", "owner", "owner")
        .project(video_card())
}

/// Comments of a video, newest first
pub fn video_comments(video: &Uuid) -> Pipeline {
    Pipeline::new()
        .matching(Filter::id_eq("video", video))
        .join_one("users", "owner", "owner")
        .sort(SortKey::with_tie_break("createdAt", SortDirection::Desc))
        .project(
            Projection::new()
                .include_all(&["id", "content", "createdAt"])
                .nested("owner", owner_summary()),
        )
}

/// Videos a user liked that still exist and are published, most recently
/// liked first
pub fn liked_videos(user: &Uuid) -> Pipeline {
    Pipeline::new()
        .matching(Filter::and([
            Filter::id_eq("likedBy", user),
            Filter::ne("video", Value::Null),
        ]))
        .join_one("videos", "video", "video")
        .matching(Filter::eq("video.isPublished", true))
        .sort(SortKey::with_tie_break("createdAt", SortDirection::Desc))
        .project(
            Projection::new()
                .path("likedAt", "createdAt")
                .path("videoId", "video.id")
                .path("title", "video.title")
                .path("thumbnail", "video.thumbnail")
                .path("views", "video.views")
                .path("duration", "video.duration")
                .path("owner", "video.owner"),
        )
}

fn channel_summary(from: &str) -> Projection {
    Projection::new()
        .path("id", format!("{}.id", from))
        .path("username", format!("{}.username", from))
        .path("fullName", format!("{}.fullName", from))
        .path("avatar", format!("{}.avatar", from))
}

/// Users subscribed to a channel, most recent subscription first
pub fn channel_subscribers(channel: &Uuid) -> Pipeline {
    Pipeline::new()
        .matching(Filter::id_eq("channel", channel))
        .join_one("users", "subscriber", "subscriber")
        .sort(SortKey::with_tie_break("createdAt", SortDirection::Desc))
        .project(channel_summary("subscriber"))
}

/// Channels a user subscribed to, most recent subscription first
pub fn subscribed_channels(subscriber: &Uuid) -> Pipeline {
    Pipeline::new()
        .matching(Filter::id_eq("subscriber", subscriber))
        .join_one("users", "channel", "channel")
        .sort(SortKey::with_tie_break("createdAt", SortDirection::Desc))
        .project(channel_summary("channel"))
}

/// Tweets of a user, newest first
pub fn user_tweets(owner: &Uuid) -> Pipeline {
    Pipeline::new()
        .matching(Filter::id_eq("owner", owner))
        .join_one("users", "owner", "owner")
        .sort(SortKey::with_tie_break("createdAt", SortDirection::Desc))
        .project(
            Projection::new()
                .include_all(&["id", "content", "createdAt"])
                .nested("owner", owner_summary()),
        )
}

/// Published videos of a channel as full documents, newest first
pub fn channel_videos(owner: &Uuid) -> Pipeline {
    Pipeline::new()
        .matching(Filter::and([Filter::id_eq("owner", owner), published()]))
        .sort(SortKey::with_tie_break("createdAt", SortDirection::Desc))
}

/// `{ totalVideos, totalViews }` over every video of a channel
pub fn channel_video_stats(owner: &Uuid) -> Pipeline {
    let mut accumulators = IndexMap::new();
    accumulators.insert("totalVideos".to_string(), Accumulator::Count);
    accumulators.insert("totalViews".to_string(), Accumulator::Sum("views".to_string()));

    Pipeline::new()
        .matching(Filter::id_eq("owner", owner))
        .group(accumulators)
}

/// `{ totalLikes }` over likes on any video of a channel
pub fn channel_like_stats(owner: &Uuid) -> Pipeline {
    Pipeline::new()
        .matching(Filter::ne("video", Value::Null))
        .join_one("videos", "video", "video")
        .matching(Filter::id_eq("video.owner", owner))
        .count("totalLikes")
}

/// `{ totalSubscribers }` of a channel
pub fn channel_subscriber_stats(channel: &Uuid) -> Pipeline {
    Pipeline::new()
        .matching(Filter::id_eq("channel", channel))
        .count("totalSubscribers")
}
