use super::videos::visible_video;
use crate::aggregation::{self, LikedVideo};
use crate::core::entity::{Entity, Owned};
use crate::core::error::{ApiError, StoreError};
use crate::core::query::{Page, PageRequest};
use crate::entities::{Like, LikeTarget};
use crate::storage::{DocumentStore, Filter, Repository};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct LikeService {
    store: Arc<dyn DocumentStore>,
    likes: Repository<Like>,
}

impl LikeService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            likes: Repository::new(store.clone()),
            store,
        }
    }

    /// Like `target` if the actor has not yet, otherwise remove the like.
    /// Returns whether the target is liked afterwards.
    pub async fn toggle(&self, actor: &Uuid, target: LikeTarget) -> Result<bool, ApiError> {
        let existing = Filter::and([
            Filter::id_eq(Like::owner_field(), actor),
            Filter::id_eq(target.field(), &target.id()),
        ]);

        if self.likes.delete(&existing).await?.is_some() {
            tracing::debug!(actor = %actor, target = target.field(), "removed like");
            return Ok(false);
        }

        // Hidden videos cannot be liked by anyone but their owner
        let target_filter = match target {
            LikeTarget::Video(id) => visible_video(Some(actor), &id),
            _ => Filter::by_id(&target.id()),
        };
        let target_exists = self
            .store
            .find_one(target.collection(), &target_filter)
            .await?
            .is_some();
        if !target_exists {
            return Err(ApiError::not_found(format!("{} not found", target.label())));
        }

        match self.likes.insert(Like::new(target, *actor)).await {
            Ok(_) => Ok(true),
            // a concurrent toggle created it first
            Err(StoreError::DuplicateKey { .. }) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    /// Published videos the actor liked, most recently liked first
    pub async fn liked_videos(
        &self,
        actor: &Uuid,
        page: PageRequest,
    ) -> Result<Page<LikedVideo>, ApiError> {
        Ok(aggregation::paginate(
            self.store.as_ref(),
            Like::resource_name(),
            &aggregation::liked_videos(actor),
            page,
        )
        .await?)
    }
}
