use std::sync::Arc;

use coinquote::api::ApiServer;
use coinquote::config::{Config, LogFormat};
use coinquote::exchanges::MarketData;
use coinquote::exchanges::coinbase::Coinbase;
use coinquote::products::ProductCatalog;
use coinquote::service::QuoteService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let market: Arc<dyn MarketData> =
        Arc::new(Coinbase::new(&config.market_data_url, config.request_timeout)?);

    tracing::info!(
        "Quote service starting: market data from [{}] {} on port {}",
        market.name(),
        config.market_data_url,
        config.api_port
    );

    let service = Arc::new(QuoteService::new(ProductCatalog::new(), market));

    // ── 1. Fetch the product catalog (required before serving) ────
    let count = service.refresh_products().await?;
    tracing::info!("Fetched all products ({count})");

    // ── 2. Keep the catalog fresh in the background ────────────────
    let refresher = Arc::clone(&service);
    let period = config.products_refresh;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // first tick completes immediately and the catalog is already loaded
        interval.tick().await;
        loop {
            interval.tick().await;
            match refresher.refresh_products().await {
                Ok(count) => tracing::debug!("Refreshed products ({count})"),
                Err(e) => tracing::warn!(
                    "Product refresh failed, keeping {} cached products: {e}",
                    refresher.catalog().len()
                ),
            }
        }
    });

    // ── 3. Serve until Ctrl+C ──────────────────────────────────────
    ApiServer::new(service).run(&config).await
}
