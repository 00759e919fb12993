//! ServerBuilder for fluent API to build the HTTP server

use super::handlers::route_not_found;
use super::router::{API_PREFIX, build_api_routes};
use super::state::AppState;
use crate::config::AppConfig;
use crate::core::auth::{AuthProvider, HeaderAuthProvider, authenticate};
use crate::media::MediaStorage;
use crate::services::Services;
use crate::storage::{DocumentStore, unique_indexes};
use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the application router
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_media(LocalMediaStorage::new("./public/media", "http://localhost:8000/media"))
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    media: Option<Arc<dyn MediaStorage>>,
    auth_provider: Arc<dyn AuthProvider>,
    staging_dir: PathBuf,
    max_upload_bytes: usize,
    cors: CorsLayer,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        let media = crate::config::MediaConfig::default();

        Self {
            store: None,
            media: None,
            auth_provider: Arc::new(HeaderAuthProvider),
            staging_dir: media.staging_dir,
            max_upload_bytes: media.max_upload_bytes,
            cors: CorsLayer::permissive(),
            custom_routes: Vec::new(),
        }
    }

    /// Take staging and upload settings from the configuration
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.staging_dir = config.media.staging_dir.clone();
        self.max_upload_bytes = config.media.max_upload_bytes;
        self
    }

    /// Set the document store (required)
    pub fn with_store(self, store: impl DocumentStore + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set a document store chosen at runtime
    pub fn with_shared_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the media storage (required)
    pub fn with_media(self, media: impl MediaStorage + 'static) -> Self {
        self.with_shared_media(Arc::new(media))
    }

    pub fn with_shared_media(mut self, media: Arc<dyn MediaStorage>) -> Self {
        self.media = Some(media);
        self
    }

    /// Replace the default `x-user-id` header provider
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth_provider = Arc::new(provider);
        self
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Replace the permissive default CORS policy
    pub fn with_cors(mut self, cors: CorsLayer) -> Self {
        self.cors = cors;
        self
    }

    /// Add custom routes to the server, merged at the root (outside
    /// `/api/v1`) and subject to the same middleware
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the shared handler state
    pub fn build_state(&self) -> Result<AppState> {
        let store = self
            .store
            .clone()
            .ok_or_else(|| anyhow::anyhow!("DocumentStore is required. Call .with_store()"))?;
        let media = self
            .media
            .clone()
            .ok_or_else(|| anyhow::anyhow!("MediaStorage is required. Call .with_media()"))?;

        Ok(AppState::new(
            Services::new(store, media),
            self.staging_dir.clone(),
        ))
    }

    /// Build the complete router
    ///
    /// Unique indexes are not created here; call [`prepare_store`](Self::prepare_store)
    /// first, or use [`serve`](Self::serve) which does both.
    pub fn build(mut self) -> Result<Router> {
        let state = self.build_state()?;
        let custom_routes = std::mem::take(&mut self.custom_routes);

        let mut app = Router::new().nest(API_PREFIX, build_api_routes(state));
        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        // Outermost first
        let layers = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(self.cors)
            .layer(middleware::from_fn_with_state(
                self.auth_provider.clone(),
                authenticate,
            ))
            .layer(DefaultBodyLimit::max(self.max_upload_bytes));

        Ok(app.fallback(route_not_found).layer(layers))
    }

    /// Create the unique indexes the services rely on
    pub async fn prepare_store(&self) -> Result<()> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("DocumentStore is required. Call .with_store()"))?;

        store.ensure_indexes(&unique_indexes()).await?;
        tracing::info!(backend = store.backend_name(), "unique indexes ensured");
        Ok(())
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Ensure the unique indexes exist
    /// - Bind to the provided address
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .with_store(store)
    ///     .with_media(media)
    ///     .serve("127.0.0.1:8000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        self.prepare_store().await?;
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
