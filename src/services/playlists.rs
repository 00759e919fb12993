use super::videos::VideoService;
use crate::core::error::ApiError;
use crate::core::validation::require_text;
use crate::entities::Playlist;
use crate::storage::{DocumentStore, Filter, Repository, SortDirection, SortKey, Update, id_value};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

const DUPLICATE_NAME: &str = "Playlist with same name already exists";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewPlaylist {
    #[validate(length(max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

/// Fields of a playlist an owner may change; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PlaylistPatch {
    #[validate(length(max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl PlaylistPatch {
    /// The update holding exactly the supplied fields
    fn into_update(self) -> Result<Update, ApiError> {
        if self.name.is_none() && self.description.is_none() {
            return Err(ApiError::invalid("At least one field is required to update"));
        }

        let mut update = Update::new();
        if let Some(name) = self.name.as_deref() {
            update = update.set("name", require_text("name", Some(name), "Name must not be blank")?);
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

/// Renaming onto an existing name is reported with a playlist-specific message
fn rename_conflict(err: ApiError) -> ApiError {
    match err {
        ApiError::Conflict(_) => ApiError::conflict(DUPLICATE_NAME),
        other => other,
    }
}

#[derive(Clone)]
pub struct PlaylistService {
    playlists: Repository<Playlist>,
    videos: VideoService,
}

impl PlaylistService {
    pub fn new(store: Arc<dyn DocumentStore>, videos: VideoService) -> Self {
        Self {
            playlists: Repository::new(store),
            videos,
        }
    }

    pub async fn create(&self, actor: &Uuid, input: NewPlaylist) -> Result<Playlist, ApiError> {
        let name = require_text("name", input.name.as_deref(), "Playlist name is required")?;
        let description = require_text(
            "description",
            input.description.as_deref(),
            "Playlist description is required",
        )?;

        self.playlists
            .insert(Playlist::new(*actor, name, description))
            .await
            .map_err(|e| rename_conflict(e.into()))
    }

    pub async fn get(&self, id: &Uuid) -> Result<Playlist, ApiError> {
        self.playlists
            .get(id)
            .await?
            .ok_or_else(Repository::<Playlist>::not_found)
    }

    /// Playlists of a user, newest first
    pub async fn list_for_user(&self, user: &Uuid) -> Result<Vec<Playlist>, ApiError> {
        Ok(self
            .playlists
            .find(
                &Filter::id_eq("owner", user),
                &SortKey::with_tie_break("createdAt", SortDirection::Desc),
            )
            .await?)
    }

    pub async fn update(
        &self,
        actor: &Uuid,
        id: &Uuid,
        patch: PlaylistPatch,
    ) -> Result<Playlist, ApiError> {
        let update = patch.into_update()?;
        self.playlists
            .update_owned(id, actor, update)
            .await
            .map_err(rename_conflict)
    }

    pub async fn delete(&self, actor: &Uuid, id: &Uuid) -> Result<(), ApiError> {
        self.playlists.delete_owned(id, actor).await?;
        Ok(())
    }

    /// Append a video unless the playlist already holds it
    pub async fn add_video(
        &self,
        actor: &Uuid,
        playlist: &Uuid,
        video: &Uuid,
    ) -> Result<Playlist, ApiError> {
        self.videos.require_visible(Some(actor), video).await?;
        self.playlists
            .update_owned(playlist, actor, Update::new().add_to_set("videos", id_value(video)))
            .await
    }

    pub async fn remove_video(
        &self,
        actor: &Uuid,
        playlist: &Uuid,
        video: &Uuid,
    ) -> Result<Playlist, ApiError> {
        self.playlists
            .update_owned(playlist, actor, Update::new().pull("videos", id_value(video)))
            .await
    }
}
