use std::{net::SocketAddr, sync::Arc};

use tokio::signal;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod error;
mod handlers;
mod models;
mod services;
mod state;
mod utils;

use config::Config;
use services::rate_limit::{spawn_sweeper, InMemoryStore, RateLimitStore};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("portfolio_api=debug,tower_http=debug")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Rate limit counters live in memory; sweep expired windows in the background
    let store: Arc<dyn RateLimitStore> = Arc::new(InMemoryStore::new());
    let sweeper = spawn_sweeper(store.clone(), config.sweep_interval);

    let state = AppState::from_config(&config, store);
    tracing::info!(
        "Rate limits: GET /portfolio {}, POST /portfolio {}",
        state.get_limiter.quota(),
        state.post_limiter.quota()
    );

    let app = app::build_app(state);

    let addr = config.addr();
    tracing::info!("🚀 Portfolio API running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.abort();
    tracing::info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
