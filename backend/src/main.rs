use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use stock_analytics_backend::app;
use stock_analytics_backend::config::AppConfig;
use stock_analytics_backend::external::price_provider::PriceProvider;
use stock_analytics_backend::external::stock_exchange::StockExchangeProvider;
use stock_analytics_backend::logging::{init_logging, LoggingConfig};
use stock_analytics_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())?;

    let config = AppConfig::from_env().context("invalid configuration")?;

    let provider: Arc<dyn PriceProvider> = Arc::new(
        StockExchangeProvider::from_config(&config).context("failed to create stock exchange client")?,
    );
    tracing::info!(
        "Using stock exchange at {} (timeout {:?}, cache ttl {:?}, correlation {})",
        config.base_url,
        config.upstream_timeout,
        config.cache_ttl,
        config.correlation_method
    );

    let state = AppState::new(provider, &config);
    let app = app::create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Stock analytics backend running at http://{}/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping");
}
