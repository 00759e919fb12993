//! vidtube server
//!
//! Usage: `vidtube [config.yaml]`. The path may also come from
//! `VIDTUBE_CONFIG`; without either, built-in defaults are used. `VIDTUBE_*`
//! variables override individual settings.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vidtube::prelude::*;

fn load_config() -> Result<AppConfig> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("VIDTUBE_CONFIG").ok());

    let mut config = match path.as_deref() {
        Some(path) => AppConfig::from_yaml_file(path)?,
        None => AppConfig::default(),
    };
    config.apply_env_overrides()?;
    Ok(config)
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.database.backend {
        DatabaseBackend::InMemory => Ok(Arc::new(InMemoryStore::new())),
        #[cfg(feature = "mongodb_backend")]
        DatabaseBackend::Mongodb => {
            let store = MongoStore::connect(&config.database.uri, &config.database.name)
                .await
                .with_context(|| format!("failed to connect to {}", config.database.uri))?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongodb_backend"))]
        DatabaseBackend::Mongodb => Err(anyhow::anyhow!(
            "database.backend is mongodb but vidtube was built without the mongodb_backend feature"
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("invalid logging filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = open_store(&config).await?;
    tracing::info!(
        backend = store.backend_name(),
        database = %config.database.name,
        "document store ready"
    );

    tokio::fs::create_dir_all(&config.media.root)
        .await
        .with_context(|| format!("failed to create {}", config.media.root.display()))?;
    let media = LocalMediaStorage::new(config.media.root.clone(), config.media.base_url.clone());

    ServerBuilder::new()
        .with_config(&config)
        .with_shared_store(store)
        .with_media(media)
        .serve(&config.bind_address())
        .await
}
