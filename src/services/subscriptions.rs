use super::users::UserService;
use crate::aggregation::{self, ChannelSummary};
use crate::core::entity::Entity;
use crate::core::error::{ApiError, StoreError};
use crate::core::query::{Page, PageRequest};
use crate::entities::Subscription;
use crate::storage::{DocumentStore, Filter, Repository};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn DocumentStore>,
    subscriptions: Repository<Subscription>,
    users: UserService,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            subscriptions: Repository::new(store.clone()),
            users: UserService::new(store.clone()),
            store,
        }
    }

    /// Subscribe the actor to `channel`, or unsubscribe if already
    /// subscribed. Returns whether the actor is subscribed afterwards.
    pub async fn toggle(&self, actor: &Uuid, channel: &Uuid) -> Result<bool, ApiError> {
        if actor == channel {
            return Err(ApiError::invalid_field(
                "channelId",
                "You cannot subscribe to your own channel",
            ));
        }

        let existing = Filter::and([
            Filter::id_eq("subscriber", actor),
            Filter::id_eq("channel", channel),
        ]);
        if self.subscriptions.delete(&existing).await?.is_some() {
            return Ok(false);
        }

        self.users.require(channel, "Channel not found").await?;

        match self
            .subscriptions
            .insert(Subscription::new(*actor, *channel))
            .await
        {
            Ok(_) => Ok(true),
            Err(StoreError::DuplicateKey { .. }) => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    /// Users subscribed to `channel`, most recent first
    pub async fn subscribers(
        &self,
        channel: &Uuid,
        page: PageRequest,
    ) -> Result<Page<ChannelSummary>, ApiError> {
        self.users.require(channel, "Channel not found").await?;

        Ok(aggregation::paginate(
            self.store.as_ref(),
            Subscription::resource_name(),
            &aggregation::channel_subscribers(channel),
            page,
        )
        .await?)
    }

    /// Channels `subscriber` follows, most recent first
    pub async fn subscribed_channels(
        &self,
        subscriber: &Uuid,
        page: PageRequest,
    ) -> Result<Page<ChannelSummary>, ApiError> {
        self.users.require(subscriber, "Subscriber not found").await?;

        Ok(aggregation::paginate(
            self.store.as_ref(),
            Subscription::resource_name(),
            &aggregation::subscribed_channels(subscriber),
            page,
        )
        .await?)
    }
}
