//! Users and watch history
//!
//! Accounts are owned by an external identity service in production; this
//! service provides registration for fixtures, lookups used as existence
//! checks, and the watch history.

use crate::aggregation::{self, VideoCard};
use crate::core::entity::Entity;
use crate::core::error::{ApiError, StoreError};
use crate::core::validation::not_blank;
use crate::entities::{User, Video};
use crate::storage::{DocumentStore, Filter, Repository, Update, id_value};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(custom(function = "not_blank"), length(min = 3, max = 30))]
    pub username: String,

    #[validate(email(message = "must be a valid email"))]
    pub email: String,

    #[validate(custom(function = "not_blank"), length(max = 100))]
    pub full_name: String,

    #[validate(url(message = "must be a URL"))]
    pub avatar: String,

    #[validate(url(message = "must be a URL"))]
    pub cover_image: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
    users: Repository<User>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            users: Repository::new(store.clone()),
            store,
        }
    }

    pub async fn register(&self, input: NewUser) -> Result<User, ApiError> {
        let user = User::new(
            input.username,
            input.email,
            input.full_name,
            input.avatar,
            input.cover_image,
        );

        match self.users.insert(user).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "registered user");
                Ok(user)
            }
            Err(StoreError::DuplicateKey { .. }) => Err(ApiError::conflict(
                "User with this username or email already exists",
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: &Uuid) -> Result<User, ApiError> {
        self.users
            .get(id)
            .await?
            .ok_or_else(Repository::<User>::not_found)
    }

    /// `NotFound` with `message` unless the user exists
    pub async fn require(&self, id: &Uuid, message: &str) -> Result<(), ApiError> {
        if self.users.exists(&Filter::by_id(id)).await? {
            Ok(())
        } else {
            Err(ApiError::not_found(message))
        }
    }

    /// Move `video` to the front of the user's watch history
    ///
    /// Remove-then-prepend keeps the list duplicate free; it is not capped.
    pub async fn record_view(&self, user: &Uuid, video: &Uuid) -> Result<(), ApiError> {
        let filter = Filter::by_id(user);

        let pulled = self
            .users
            .update(&filter, Update::new().pull("watchHistory", id_value(video)))
            .await?;
        if pulled.is_none() {
            tracing::debug!(user_id = %user, "viewer has no user record, history not kept");
            return Ok(());
        }

        self.users
            .update(&filter, Update::new().push_front("watchHistory", id_value(video)))
            .await?;
        Ok(())
    }

    /// Published videos from the watch history, most recent first
    pub async fn watch_history(&self, user: &Uuid) -> Result<Vec<VideoCard>, ApiError> {
        let user = self.get(user).await?;
        if user.watch_history.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .store
            .aggregate(
                Video::resource_name(),
                &aggregation::videos_by_ids(&user.watch_history),
            )
            .await?;

        let mut cards: HashMap<Uuid, VideoCard> = rows
            .into_iter()
            .map(|row| {
                serde_json::from_value::<VideoCard>(row)
                    .map(|card| (card.id, card))
                    .map_err(|e| StoreError::serialization("videos", e))
            })
            .collect::<Result<_, _>>()?;

        Ok(user
            .watch_history
            .iter()
            .filter_map(|id| cards.remove(id))
            .collect())
    }
}
