//! Subscription handlers

use crate::aggregation::ChannelSummary;
use crate::core::auth::Actor;
use crate::core::query::{Page, PageParams};
use crate::core::response::{ApiResponse, ApiResult};
use crate::core::validation::{ParsedQuery, parse_id};
use crate::server::state::AppState;
use axum::extract::{Path, State};
use serde_json::{Value, json};

pub async fn toggle_subscription(
    State(state): State<AppState>,
    Actor(actor): Actor,
    Path(channel_id): Path<String>,
) -> ApiResult<Value> {
    let channel_id = parse_id("channelId", &channel_id)?;
    let subscribed = state
        .services
        .subscriptions
        .toggle(&actor, &channel_id)
        .await?;

    let message = if subscribed {
        "Subscribed successfully"
    } else {
        "Unsubscribed successfully"
    };
    Ok(ApiResponse::ok(json!({ "subscribed": subscribed }), message))
}

pub async fn channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    ParsedQuery(params): ParsedQuery<PageParams>,
) -> ApiResult<Page<ChannelSummary>> {
    let channel_id = parse_id("channelId", &channel_id)?;
    let page = params.parse()?;

    let subscribers = state
        .services
        .subscriptions
        .subscribers(&channel_id, page)
        .await?;
    Ok(ApiResponse::ok(subscribers, "Subscribers fetched successfully"))
}

pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
    ParsedQuery(params): ParsedQuery<PageParams>,
) -> ApiResult<Page<ChannelSummary>> {
    let subscriber_id = parse_id("subscriberId", &subscriber_id)?;
    let page = params.parse()?;

    let channels = state
        .services
        .subscriptions
        .subscribed_channels(&subscriber_id, page)
        .await?;
    Ok(ApiResponse::ok(channels, "Subscribed channels fetched successfully"))
}
