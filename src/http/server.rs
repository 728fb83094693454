//! HTTP server startup logic.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid listen address {0}")]
    Address(String),
}

/// Resolve `host` (an IP literal or a hostname) and `port` into the first
/// socket address it names.
pub async fn bind_address(host: &str, port: u16) -> Result<SocketAddr, ServerError> {
    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| ServerError::Address(format!("{}:{} ({})", host, port, e)))?;
    addrs
        .next()
        .ok_or_else(|| ServerError::Address(format!("{}:{} (no addresses)", host, port)))
}

/// Start a plain HTTP server.
///
/// Blocks until a shutdown signal arrives and in-flight requests have drained.
pub async fn start_server(app: Router, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await?;

    tracing::info!("Server stopped accepting connections");
    Ok(())
}
