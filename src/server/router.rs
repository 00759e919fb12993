//! Route table of the `/api/v1` surface

use super::handlers::{
    comments, dashboard, health, likes, playlists, subscriptions, tweets, users, videos,
};
use super::state::AppState;
use axum::Router;
use axum::routing::{get, patch, post};

/// Prefix every API route is nested under
pub const API_PREFIX: &str = "/api/v1";

/// Build the API routes, relative to [`API_PREFIX`]
///
/// - `/healthcheck`
/// - `/users`, `/users/history`, `/users/{user_id}`
/// - `/videos`, `/videos/{video_id}`, `/videos/toggle/publish/{video_id}`
/// - `/comments/{video_id}`, `/comments/c/{comment_id}`
/// - `/likes/toggle/{v|c|t}/{id}`, `/likes/videos`
/// - `/subscriptions/c/{channel_id}`, `/subscriptions/u/{subscriber_id}`
/// - `/tweets`, `/tweets/user/{user_id}`, `/tweets/{tweet_id}`
/// - `/playlist`, `/playlist/{playlist_id}`, `/playlist/user/{user_id}`,
///   `/playlist/{add|remove}/{video_id}/{playlist_id}`
/// - `/dashboard/stats`, `/dashboard/videos`
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health::healthcheck))
        .merge(user_routes())
        .merge(video_routes())
        .merge(comment_routes())
        .merge(like_routes())
        .merge(subscription_routes())
        .merge(tweet_routes())
        .merge(playlist_routes())
        .merge(dashboard_routes())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::register_user))
        .route("/users/history", get(users::watch_history))
        .route("/users/{user_id}", get(users::get_user))
}

fn video_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/videos",
            get(videos::list_videos).post(videos::publish_video),
        )
        .route(
            "/videos/{video_id}",
            get(videos::get_video)
                .patch(videos::update_video)
                .delete(videos::delete_video),
        )
        .route(
            "/videos/toggle/publish/{video_id}",
            patch(videos::toggle_publish),
        )
}

fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/comments/{video_id}",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route(
            "/comments/c/{comment_id}",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
}

fn like_routes() -> Router<AppState> {
    Router::new()
        .route("/likes/toggle/v/{video_id}", post(likes::toggle_video_like))
        .route("/likes/toggle/c/{comment_id}", post(likes::toggle_comment_like))
        .route("/likes/toggle/t/{tweet_id}", post(likes::toggle_tweet_like))
        .route("/likes/videos", get(likes::liked_videos))
}

fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions/c/{channel_id}",
            post(subscriptions::toggle_subscription).get(subscriptions::channel_subscribers),
        )
        .route(
            "/subscriptions/u/{subscriber_id}",
            get(subscriptions::subscribed_channels),
        )
}

fn tweet_routes() -> Router<AppState> {
    Router::new()
        .route("/tweets", post(tweets::create_tweet))
        .route("/tweets/user/{user_id}", get(tweets::user_tweets))
        .route(
            "/tweets/{tweet_id}",
            patch(tweets::update_tweet).delete(tweets::delete_tweet),
        )
}

fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/playlist", post(playlists::create_playlist))
        .route(
            "/playlist/{playlist_id}",
            get(playlists::get_playlist)
                .patch(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route("/playlist/user/{user_id}", get(playlists::user_playlists))
        .route(
            "/playlist/add/{video_id}/{playlist_id}",
            patch(playlists::add_video),
        )
        .route(
            "/playlist/remove/{video_id}/{playlist_id}",
            patch(playlists::remove_video),
        )
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(dashboard::channel_stats))
        .route("/dashboard/videos", get(dashboard::channel_videos))
}
