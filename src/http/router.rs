//! Router and server startup.
//!
//! Middleware: permissive CORS and request tracing.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::http::handlers;
use crate::llm::TextCompleter;
use crate::service::GenerationService;
use crate::store::JobStore;

pub fn build_router<C, S>(service: Arc<GenerationService<C, S>>) -> Router
where
    C: TextCompleter + 'static,
    S: JobStore + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::<C, S>))
        .route("/generate", post(handlers::submit::<C, S>))
        .route("/create-eq-test", post(handlers::submit::<C, S>))
        .route("/status/{test_id}", get(handlers::status::<C, S>))
        .route("/tests", get(handlers::list::<C, S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve<C, S>(service: Arc<GenerationService<C, S>>, addr: &str) -> Result<()>
where
    C: TextCompleter + 'static,
    S: JobStore + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, build_router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
