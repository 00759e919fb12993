use super::users::UserService;
use crate::aggregation::{self, TweetView};
use crate::core::entity::Entity;
use crate::core::error::ApiError;
use crate::core::query::{Page, PageRequest};
use crate::core::validation::require_text;
use crate::entities::{MAX_TWEET_CHARS, Tweet};
use crate::storage::{DocumentStore, Repository, Update};
use std::sync::Arc;
use uuid::Uuid;

/// Trimmed tweet content, 1..=280 characters
fn tweet_content(raw: Option<&str>) -> Result<String, ApiError> {
    let content = require_text("content", raw, "Tweet content is required")?;
    if content.chars().count() > MAX_TWEET_CHARS {
        return Err(ApiError::invalid_field(
            "content",
            format!("Tweet content exceeds {} characters", MAX_TWEET_CHARS),
        ));
    }
    Ok(content)
}

#[derive(Clone)]
pub struct TweetService {
    store: Arc<dyn DocumentStore>,
    tweets: Repository<Tweet>,
    users: UserService,
}

impl TweetService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tweets: Repository::new(store.clone()),
            users: UserService::new(store.clone()),
            store,
        }
    }

    pub async fn create(&self, actor: &Uuid, content: Option<&str>) -> Result<Tweet, ApiError> {
        let content = tweet_content(content)?;
        Ok(self.tweets.insert(Tweet::new(*actor, content)).await?)
    }

    /// Tweets of a user, newest first
    pub async fn list_for_user(
        &self,
        user: &Uuid,
        page: PageRequest,
    ) -> Result<Page<TweetView>, ApiError> {
        self.users.require(user, "User not found").await?;

        Ok(aggregation::paginate(
            self.store.as_ref(),
            Tweet::resource_name(),
            &aggregation::user_tweets(user),
            page,
        )
        .await?)
    }

    pub async fn update(
        &self,
        actor: &Uuid,
        id: &Uuid,
        content: Option<&str>,
    ) -> Result<Tweet, ApiError> {
        let content = tweet_content(content)?;
        self.tweets
            .update_owned(id, actor, Update::new().set("content", content))
            .await
    }

    pub async fn delete(&self, actor: &Uuid, id: &Uuid) -> Result<(), ApiError> {
        self.tweets.delete_owned(id, actor).await?;
        Ok(())
    }
}
