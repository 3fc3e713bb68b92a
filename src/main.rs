use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recommender_api::{
    api::{create_router, AppState},
    config::Config,
    services::Recommender,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recommender_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let strategy = config.scan_strategy()?;

    // Load and validate the dataset before binding; requests never see partial data.
    let (catalogue_path, similarity_path) =
        (config.catalogue_path.clone(), config.similarity_path.clone());
    let recommender = tokio::task::spawn_blocking(move || {
        Recommender::load(&catalogue_path, &similarity_path, strategy)
    })
    .await
    .context("Dataset loader panicked")?
    .context("Failed to load recommendation dataset")?;

    let state = AppState::new(recommender).with_limits(config.default_k, config.max_k);
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app).await?;
    Ok(())
}
