//! HTTP API for chunk ingestion and summary retrieval
//!
//! - POST /summarize (alias /summarization) - Fold a chunk into the running summary
//! - GET /summary - Read a summary, translated on request
//! - GET /health - Health check

mod error;
mod handlers;
mod routes;
mod state;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::summary::SummaryService;

pub use error::status_for;
pub use handlers::{
    ErrorResponse, SummarizeRequest, SummarizeResponse, SummaryQuery, SummaryResponse,
};
pub use routes::create_router;
pub use state::AppState;

/// Serve the API on `bind` until Ctrl-C.
pub async fn serve(service: SummaryService, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", bind))?;
    info!("HTTP API listening on {}", listener.local_addr()?);

    let app = create_router(AppState::new(service));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
