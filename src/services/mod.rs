//! Resource services
//!
//! One service per resource. Services take already-parsed identifiers and
//! page requests, validate the remaining inputs before touching the store,
//! and return domain values or an [`ApiError`](crate::core::error::ApiError).

pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

pub use comments::CommentService;
pub use dashboard::DashboardService;
pub use likes::LikeService;
pub use playlists::{NewPlaylist, PlaylistPatch, PlaylistService};
pub use subscriptions::SubscriptionService;
pub use tweets::TweetService;
pub use users::{NewUser, UserService};
pub use videos::{PublishVideo, VideoPatch, VideoService};

use crate::media::MediaStorage;
use crate::storage::DocumentStore;
use std::sync::Arc;

/// Every service, sharing one store and one media storage
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub videos: VideoService,
    pub comments: CommentService,
    pub likes: LikeService,
    pub subscriptions: SubscriptionService,
    pub tweets: TweetService,
    pub playlists: PlaylistService,
    pub dashboard: DashboardService,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>, media: Arc<dyn MediaStorage>) -> Self {
        let videos = VideoService::new(store.clone(), media);

        Self {
            users: UserService::new(store.clone()),
            comments: CommentService::new(store.clone(), videos.clone()),
            likes: LikeService::new(store.clone()),
            subscriptions: SubscriptionService::new(store.clone()),
            tweets: TweetService::new(store.clone()),
            playlists: PlaylistService::new(store.clone(), videos.clone()),
            dashboard: DashboardService::new(store, videos.clone()),
            videos,
        }
    }
}
