pub mod handlers;
pub mod models;
pub mod router;

use crate::config::Config;
use crate::service::QuoteService;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct ApiServer {
    service: Arc<QuoteService>,
}

impl ApiServer {
    /// Shares the quote service with every handler.
    pub fn new(service: Arc<QuoteService>) -> Self {
        Self { service }
    }

    /// Binds the server to the configured port and starts serving.
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let app = router::with_metrics(router::build(Arc::clone(&self.service)));
        let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));

        tracing::info!("API server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
            .await?;

        Ok(())
    }
}

/// Resolves once `signal` fires. If the signal handler cannot be installed
/// the error is logged and the server keeps running until killed.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => tracing::info!("Shutting down..."),
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl+C, graceful shutdown disabled: {e}");
            std::future::pending::<()>().await;
        }
    }
}
