use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use skincare_recommender::{
    config::Config,
    db::{create_pool, PgHistoryStore},
    routes::{create_router, AppState},
    services::{catalog::load_catalog, Recommender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skincare_recommender=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let images_path = config
        .images_path
        .as_deref()
        .filter(|p| !p.as_os_str().is_empty());
    let products = load_catalog(&config.catalog_path, images_path).with_context(|| {
        format!("Failed to load catalog from {}", config.catalog_path.display())
    })?;

    // Vectorizing and the similarity matrix are CPU bound
    let max_features = config.max_features;
    let recommender =
        tokio::task::spawn_blocking(move || Recommender::with_max_features(products, max_features))
            .await?;

    let mut state = AppState::new(recommender, config.default_top_n);

    match config.database_url.as_deref() {
        Some(url) => match create_pool(url).await {
            Ok(pool) => {
                tracing::info!("History store connected");
                state = state.with_history(Arc::new(PgHistoryStore::new(pool)));
            }
            Err(e) => {
                tracing::warn!(error = %e, "History store unavailable, recommendations will not be recorded");
            }
        },
        None => tracing::info!("DATABASE_URL not set, recommendations will not be recorded"),
    }

    let app = create_router(Arc::new(state));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
