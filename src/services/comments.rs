use super::users::UserService;
use super::videos::VideoService;
use crate::aggregation::{self, CommentView, OwnerSummary};
use crate::core::entity::Entity;
use crate::core::error::ApiError;
use crate::core::query::{Page, PageRequest};
use crate::core::validation::require_text;
use crate::entities::Comment;
use crate::storage::{DocumentStore, Repository, Update};
use std::sync::Arc;
use uuid::Uuid;

const CONTENT_REQUIRED: &str = "Content is required";

#[derive(Clone)]
pub struct CommentService {
    store: Arc<dyn DocumentStore>,
    comments: Repository<Comment>,
    users: UserService,
    videos: VideoService,
}

impl CommentService {
    pub fn new(store: Arc<dyn DocumentStore>, videos: VideoService) -> Self {
        Self {
            comments: Repository::new(store.clone()),
            users: UserService::new(store.clone()),
            store,
            videos,
        }
    }

    /// Comments of a video, newest first, with their authors
    pub async fn list(
        &self,
        viewer: Option<&Uuid>,
        video: &Uuid,
        page: PageRequest,
    ) -> Result<Page<CommentView>, ApiError> {
        self.videos.require_visible(viewer, video).await?;

        Ok(aggregation::paginate(
            self.store.as_ref(),
            Comment::resource_name(),
            &aggregation::video_comments(video),
            page,
        )
        .await?)
    }

    /// Add a comment; the result embeds the author's public fields only
    pub async fn add(
        &self,
        actor: &Uuid,
        video: &Uuid,
        content: Option<&str>,
    ) -> Result<CommentView, ApiError> {
        let content = require_text("content", content, CONTENT_REQUIRED)?;
        self.videos.require_visible(Some(actor), video).await?;
        let author = self.users.get(actor).await?;

        let comment = self
            .comments
            .insert(Comment::new(*video, *actor, content))
            .await?;

        Ok(CommentView {
            id: comment.id,
            content: comment.content,
            created_at: comment.created_at,
            owner: OwnerSummary {
                id: author.id,
                username: author.username,
                avatar: author.avatar,
            },
        })
    }

    pub async fn update(
        &self,
        actor: &Uuid,
        id: &Uuid,
        content: Option<&str>,
    ) -> Result<Comment, ApiError> {
        let content = require_text("content", content, CONTENT_REQUIRED)?;
        self.comments
            .update_owned(id, actor, Update::new().set("content", content))
            .await
    }

    pub async fn delete(&self, actor: &Uuid, id: &Uuid) -> Result<(), ApiError> {
        self.comments.delete_owned(id, actor).await?;
        Ok(())
    }
}
