//! Tweet handlers

use super::ContentBody;
use crate::aggregation::TweetView;
use crate::core::auth::Actor;
use crate::core::query::{Page, PageParams};
use crate::core::response::{ApiResponse, ApiResult};
use crate::core::validation::{ParsedQuery, ValidatedJson, parse_id};
use crate::entities::Tweet;
use crate::server::state::AppState;
use axum::extract::{Path, State};
use serde_json::{Value, json};

pub async fn create_tweet(
    State(state): State<AppState>,
    Actor(actor): Actor,
    ValidatedJson(body): ValidatedJson<ContentBody>,
) -> ApiResult<Tweet> {
    let tweet = state
        .services
        .tweets
        .create(&actor, body.content.as_deref())
        .await?;
    Ok(ApiResponse::created(tweet, "Tweet created successfully"))
}

pub async fn user_tweets(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ParsedQuery(params): ParsedQuery<PageParams>,
) -> ApiResult<Page<TweetView>> {
    let user_id = parse_id("userId", &user_id)?;
    let page = params.parse()?;

    let tweets = state.services.tweets.list_for_user(&user_id, page).await?;
    Ok(ApiResponse::ok(tweets, "Tweets fetched successfully"))
}

pub async fn update_tweet(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(tweet_id): Path<String>,
    ValidatedJson(body): ValidatedJson<ContentBody>,
) -> ApiResult<Tweet> {
    let tweet_id = parse_id("tweetId", &tweet_id)?;
    let tweet = state
        .services
        .tweets
        .update(&actor, &tweet_id, body.content.as_deref())
        .await?;
    Ok(ApiResponse::ok(tweet, "Tweet updated successfully"))
}

pub async fn delete_tweet(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(tweet_id): Path<String>,
) -> ApiResult<Value> {
    let tweet_id = parse_id("tweetId", &tweet_id)?;
    state.services.tweets.delete(&actor, &tweet_id).await?;
    Ok(ApiResponse::ok(json!({}), "Tweet deleted successfully"))
}
