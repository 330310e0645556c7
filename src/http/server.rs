use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::application::LedgerService;

use super::handlers;

/// Build the application router around a shared ledger service.
/// The service handle is the only state; every handler is a stateless
/// request-to-response mapping over it.
pub fn router(service: LedgerService) -> Router {
    let state = Arc::new(service);

    Router::new()
        .route("/api/points", get(handlers::get_points))
        .route("/api/points/add", post(handlers::add_points))
        .route("/api/points/reduce", post(handlers::reduce_points))
        .route("/api/points/history", get(handlers::points_history))
        .route("/api/users", get(handlers::list_users))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the listener and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, service: LedgerService) -> Result<()> {
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, "points ledger listening");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
