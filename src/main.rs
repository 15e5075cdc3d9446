use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cinerec_api::{
    config::Config,
    db::{create_redis_client, Cache},
    routes::{create_router, AppState},
    services::{
        CredentialStore, ImdbPosterProvider, PosterService, SessionStore, SimilarityIndex,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinerec_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let index = SimilarityIndex::load(&config.catalog_path, &config.similarity_path)
        .context("Failed to load similarity artifacts")?;

    let credentials = CredentialStore::new(&config.users_file);
    // Fail at startup rather than on the first login if the store is corrupt
    let accounts = credentials
        .load()
        .context("Failed to read credential store")?;
    tracing::info!(
        path = %credentials.path().display(),
        accounts = accounts.len(),
        "Credential store ready"
    );

    let (cache, cache_handle) = match &config.redis_url {
        Some(redis_url) => {
            let client = create_redis_client(redis_url)?;
            let (cache, handle) = Cache::new(client).await;
            (cache, Some(handle))
        }
        None => {
            tracing::info!("REDIS_URL not set, poster caching disabled");
            (Cache::disabled(), None)
        }
    };

    let provider = ImdbPosterProvider::new(
        cache,
        config.poster_api_url.clone(),
        Duration::from_secs(config.poster_timeout_secs),
    )
    .context("Failed to build poster HTTP client")?;
    let posters = PosterService::new(
        Arc::new(provider),
        config.poster_fallback_url.clone(),
        Duration::from_secs(config.poster_timeout_secs),
    );
    let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));

    let state = Arc::new(AppState::new(
        credentials,
        index,
        posters,
        sessions,
        config.recommend_k,
    ));

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
