//! Prometheus scrape endpoint.
//!
//! Serves `GET /metrics` in the text exposition format until shutdown.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use joinvote_node::Services;
use tokio::sync::broadcast;
use tracing::{error, info};

pub async fn serve_metrics(
    services: Arc<Services>,
    port: u16,
    mut shutdown: broadcast::Receiver<()>,
) {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(services);

    let addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind metrics endpoint");
            return;
        }
    };
    info!(%addr, "metrics endpoint listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await;
    if let Err(e) = result {
        error!(error = %e, "metrics endpoint failed");
    }
}

async fn metrics_handler(State(services): State<Arc<Services>>) -> Response {
    match services.metrics.encode_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
