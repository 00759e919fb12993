use super::timestamp;
use crate::impl_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a like points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    /// Wire name of the reference field on a [`Like`]
    pub fn field(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video",
            LikeTarget::Comment(_) => "comment",
            LikeTarget::Tweet(_) => "tweet",
        }
    }

    /// Collection holding the liked entity
    pub fn collection(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "videos",
            LikeTarget::Comment(_) => "comments",
            LikeTarget::Tweet(_) => "tweets",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }

    /// Capitalised name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "Video",
            LikeTarget::Comment(_) => "Comment",
            LikeTarget::Tweet(_) => "Tweet",
        }
    }
}

/// A like on exactly one of video, comment or tweet
///
/// The unset references serialize as `null` so that the unique index over
/// `(likedBy, video, comment, tweet)` treats them uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub video: Option<Uuid>,
    pub comment: Option<Uuid>,
    pub tweet: Option<Uuid>,
    pub liked_by: Uuid,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Like, "likes", "like", owned_by liked_by as "likedBy");

impl Like {
    pub fn new(target: LikeTarget, liked_by: Uuid) -> Self {
        let now = timestamp::now();
        let (mut video, mut comment, mut tweet) = (None, None, None);
        match target {
            LikeTarget::Video(id) => video = Some(id),
            LikeTarget::Comment(id) => comment = Some(id),
            LikeTarget::Tweet(id) => tweet = Some(id),
        }

        Self {
            id: Uuid::now_v7(),
            video,
            comment,
            tweet,
            liked_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn target(&self) -> Option<LikeTarget> {
        self.video
            .map(LikeTarget::Video)
            .or(self.comment.map(LikeTarget::Comment))
            .or(self.tweet.map(LikeTarget::Tweet))
    }
}
