//! Liveness endpoint for the hosting platform's uptime probe.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::net::TcpListener;

use repowatch_core::{errors::Error, Result};

pub const LIVENESS_TEXT: &str = "🤖 Telegram bot is running!";

pub fn router() -> Router {
    Router::new().route("/", get(|| async { LIVENESS_TEXT }))
}

/// Bind `0.0.0.0:{port}`. Failing to bind is fatal at startup.
pub async fn bind(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::External(format!("failed to bind health endpoint on {addr}: {e}")))?;
    tracing::info!(%addr, "health endpoint listening");
    Ok(listener)
}

pub async fn serve(listener: TcpListener) -> Result<()> {
    axum::serve(listener, router()).await?;
    Ok(())
}
