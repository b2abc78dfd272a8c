//! mapquiz game server.

use mapquiz_core::load_atlas;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod protocol;
mod server;
mod session;

use config::ServerConfig;
use server::ServerState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    info!("Loading regions from {}", config.shapefile.display());
    let atlas = load_atlas(&config.shapefile, &config.loader)?;
    info!("Loaded {} regions", atlas.regions().len());

    let sampler = config.sampler();
    match sampler.max_trials() {
        Some(cap) => info!("Sampling with a cap of {} trials", cap),
        None => info!("Sampling without a trial cap"),
    }

    let state = Arc::new(ServerState::new(Arc::new(atlas), sampler));

    server::run_server(config.addr, state).await
}
