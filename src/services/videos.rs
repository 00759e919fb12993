//! Videos: listing, publishing, viewing and owner mutations

use super::users::UserService;
use crate::aggregation::{self, VideoDetail, VideoList, VideoQuery};
use crate::core::entity::Entity;
use crate::core::error::{ApiError, MediaError, StoreError};
use crate::core::query::{Page, PageRequest};
use crate::core::validation::require_text;
use crate::entities::Video;
use crate::media::{MediaStorage, StagedUpload, UploadedMedia, delete_best_effort};
use crate::storage::{DocumentStore, Filter, Repository, Update};
use std::sync::Arc;
use uuid::Uuid;

/// The video `id`, provided it is published or owned by `viewer`
pub fn visible_video(viewer: Option<&Uuid>, id: &Uuid) -> Filter {
    let visible = match viewer {
        Some(viewer) => Filter::or([
            Filter::eq("isPublished", true),
            Filter::id_eq("owner", viewer),
        ]),
        None => Filter::eq("isPublished", true),
    };
    Filter::and([Filter::by_id(id), visible])
}

/// Inputs of a publish request, as received
#[derive(Debug, Default)]
pub struct PublishVideo<'a> {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_file: Option<&'a StagedUpload>,
    pub thumbnail: Option<&'a StagedUpload>,
}

/// Fields of a video an owner may change; `None` leaves a field untouched
#[derive(Debug, Default)]
pub struct VideoPatch<'a> {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<&'a StagedUpload>,
}

impl VideoPatch<'_> {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.thumbnail.is_none()
    }

    /// Text fields of the patch; supplied fields must not be blank
    fn text_update(&self) -> Result<Update, ApiError> {
        let mut update = Update::new();
        if let Some(title) = self.title.as_deref() {
            update = update.set(
                "title",
                require_text("title", Some(title), "Title must not be blank")?,
            );
        }
        if let Some(description) = self.description.as_deref() {
            update = update.set(
                "description",
                require_text("description", Some(description), "Description must not be blank")?,
            );
        }
        Ok(update)
    }
}

#[derive(Clone)]
pub struct VideoService {
    store: Arc<dyn DocumentStore>,
    videos: Repository<Video>,
    users: UserService,
    media: Arc<dyn MediaStorage>,
}

impl VideoService {
    pub fn new(store: Arc<dyn DocumentStore>, media: Arc<dyn MediaStorage>) -> Self {
        Self {
            videos: Repository::new(store.clone()),
            users: UserService::new(store.clone()),
            store,
            media,
        }
    }

    async fn upload(&self, staged: &StagedUpload) -> Result<UploadedMedia, MediaError> {
        self.media.upload(staged.path()).await.inspect_err(|e| {
            tracing::warn!(
                field = staged.field(),
                file_name = staged.file_name().unwrap_or_default(),
                error = %e,
                "media upload failed"
            );
        })
    }

    /// Published videos matching `query`
    pub async fn list(&self, query: &VideoQuery, page: PageRequest) -> Result<VideoList, ApiError> {
        let page = aggregation::paginate(
            self.store.as_ref(),
            Video::resource_name(),
            &aggregation::video_listing(query),
            page,
        )
        .await?;
        Ok(VideoList::from(page))
    }

    /// Upload the video and its thumbnail, then record the video
    ///
    /// Media already uploaded is deleted again when a later step fails.
    pub async fn publish(&self, actor: &Uuid, input: PublishVideo<'_>) -> Result<Video, ApiError> {
        let title = require_text("title", input.title.as_deref(), "Title is required")?;
        let description = require_text(
            "description",
            input.description.as_deref(),
            "Description is required",
        )?;
        let video_file = input
            .video_file
            .ok_or_else(|| ApiError::invalid_field("videoFile", "Video file is required"))?;
        let thumbnail = input
            .thumbnail
            .ok_or_else(|| ApiError::invalid_field("thumbnail", "Thumbnail is required"))?;

        let uploaded_video = self.upload(video_file).await?;

        let uploaded_thumbnail = match self.upload(thumbnail).await {
            Ok(uploaded) => uploaded,
            Err(e) => {
                delete_best_effort(self.media.as_ref(), &uploaded_video.url).await;
                return Err(e.into());
            }
        };

        let video = Video::new(
            *actor,
            title,
            description,
            uploaded_video.url.clone(),
            uploaded_thumbnail.url.clone(),
            uploaded_video.duration.unwrap_or(0.0),
        );

        match self.videos.insert(video).await {
            Ok(video) => {
                tracing::info!(video_id = %video.id, owner = %actor, "published video");
                Ok(video)
            }
            Err(e) => {
                delete_best_effort(self.media.as_ref(), &uploaded_video.url).await;
                delete_best_effort(self.media.as_ref(), &uploaded_thumbnail.url).await;
                Err(e.into())
            }
        }
    }

    /// Fetch a video, counting the view and updating the viewer's history
    ///
    /// Unpublished videos are only visible to their owner.
    pub async fn view(&self, viewer: Option<&Uuid>, id: &Uuid) -> Result<VideoDetail, ApiError> {
        let filter = visible_video(viewer, id);

        let viewed = self
            .store
            .find_one_and_update(Video::resource_name(), &filter, &Update::new().inc("views", 1))
            .await?;
        if viewed.is_none() {
            return Err(Repository::<Video>::not_found());
        }

        if let Some(viewer) = viewer {
            self.users.record_view(viewer, id).await?;
        }

        let row = self
            .store
            .aggregate(Video::resource_name(), &aggregation::video_detail(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(Repository::<Video>::not_found)?;

        serde_json::from_value(row)
            .map_err(|e| StoreError::serialization(Video::resource_name(), e).into())
    }

    pub async fn update(
        &self,
        actor: &Uuid,
        id: &Uuid,
        patch: VideoPatch<'_>,
    ) -> Result<Video, ApiError> {
        if patch.is_empty() {
            return Err(ApiError::invalid("At least one field is required to update"));
        }
        let mut update = patch.text_update()?;

        // Checked up front so nothing is uploaded on behalf of a non-owner;
        // the write below is still owner-scoped.
        let current = self
            .videos
            .get(id)
            .await?
            .ok_or_else(Repository::<Video>::not_found)?;
        if current.owner != *actor {
            return Err(ApiError::forbidden("You are not allowed to update this video"));
        }

        let new_thumbnail = match patch.thumbnail {
            Some(staged) => Some(self.upload(staged).await?),
            None => None,
        };
        if let Some(uploaded) = &new_thumbnail {
            update = update.set("thumbnail", uploaded.url.clone());
        }

        match self.videos.update_owned(id, actor, update).await {
            Ok(video) => {
                if new_thumbnail.is_some() {
                    delete_best_effort(self.media.as_ref(), &current.thumbnail).await;
                }
                Ok(video)
            }
            Err(e) => {
                if let Some(uploaded) = &new_thumbnail {
                    delete_best_effort(self.media.as_ref(), &uploaded.url).await;
                }
                Err(e)
            }
        }
    }

    /// Delete a video and, best effort, its media objects
    pub async fn delete(&self, actor: &Uuid, id: &Uuid) -> Result<(), ApiError> {
        let video = self.videos.delete_owned(id, actor).await?;

        delete_best_effort(self.media.as_ref(), &video.video_file).await;
        delete_best_effort(self.media.as_ref(), &video.thumbnail).await;

        tracing::info!(video_id = %id, "deleted video");
        Ok(())
    }

    /// Flip `isPublished`
    ///
    /// The write only applies if the flag still has the value that was read;
    /// a concurrent toggle in between yields `Conflict`.
    pub async fn toggle_publish(&self, actor: &Uuid, id: &Uuid) -> Result<Video, ApiError> {
        let current = self
            .videos
            .get(id)
            .await?
            .ok_or_else(Repository::<Video>::not_found)?;
        if current.owner != *actor {
            return Err(ApiError::forbidden("You are not allowed to modify this video"));
        }

        let filter = Filter::and([
            Filter::by_id(id),
            Filter::id_eq("owner", actor),
            Filter::eq("isPublished", current.is_published),
        ]);

        match self
            .videos
            .update(&filter, Update::new().set("isPublished", !current.is_published))
            .await?
        {
            Some(video) => Ok(video),
            None if self.videos.exists(&Filter::by_id(id)).await? => Err(ApiError::conflict(
                "Publish status was changed by another request",
            )),
            None => Err(Repository::<Video>::not_found()),
        }
    }

    /// Published videos of a channel as full documents
    pub async fn channel_videos(
        &self,
        owner: &Uuid,
        page: PageRequest,
    ) -> Result<Page<Video>, ApiError> {
        Ok(aggregation::paginate(
            self.store.as_ref(),
            Video::resource_name(),
            &aggregation::channel_videos(owner),
            page,
        )
        .await?)
    }

    /// `NotFound` unless the video exists and `viewer` may see it
    pub async fn require_visible(&self, viewer: Option<&Uuid>, id: &Uuid) -> Result<(), ApiError> {
        if self.videos.exists(&visible_video(viewer, id)).await? {
            Ok(())
        } else {
            Err(Repository::<Video>::not_found())
        }
    }
}
