use super::handlers;
use crate::service::QuoteService;
use axum::Router;
use axum::routing::{get, post};
use axum_prometheus::PrometheusMetricLayer;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds and returns the full Axum router with all routes and shared state.
pub fn build(service: Arc<QuoteService>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/quote", post(handlers::quote))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Adds request metrics and a GET /metrics scrape endpoint.
/// Installs the process-wide Prometheus recorder, so call it at most once.
pub fn with_metrics(app: Router) -> Router {
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
    app.route("/metrics", get(move || async move { metric_handle.render() }))
        .layer(prometheus_layer)
}
