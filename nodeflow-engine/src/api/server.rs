//! HTTP server setup and connection handling.

use super::router;
use super::state::AppState;
use crate::engine::EvaluationEngine;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use nodeflow_core::{NodeflowError, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Configuration for the API server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
    /// Deadline applied to evaluations that do not request their own.
    pub evaluation_timeout_ms: Option<u64>,
}

impl ServerConfig {
    /// Create a new server configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// - `NODEFLOW_HOST`, `NODEFLOW_PORT`
    /// - `NODEFLOW_MAX_BODY_BYTES`
    /// - `NODEFLOW_EVALUATION_TIMEOUT_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("NODEFLOW_HOST").unwrap_or(defaults.host),
            port: std::env::var("NODEFLOW_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            max_body_bytes: std::env::var("NODEFLOW_MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            evaluation_timeout_ms: std::env::var("NODEFLOW_EVALUATION_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }

    /// Set the body size limit.
    pub fn with_max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Set the default evaluation deadline.
    pub fn with_evaluation_timeout_ms(mut self, ms: u64) -> Self {
        self.evaluation_timeout_ms = Some(ms);
        self
    }

    /// Default evaluation deadline.
    pub fn evaluation_timeout(&self) -> Option<Duration> {
        self.evaluation_timeout_ms.map(Duration::from_millis)
    }

    /// Get the socket address. `localhost` and unparseable hosts fall back
    /// to loopback and all interfaces respectively.
    pub fn socket_addr(&self) -> SocketAddr {
        let host: IpAddr = match self.host.as_str() {
            "localhost" => IpAddr::V4(Ipv4Addr::LOCALHOST),
            other => other.parse().unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
        };
        SocketAddr::new(host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_body_bytes: 10 * 1024 * 1024,
            evaluation_timeout_ms: None,
        }
    }
}

/// HTTP API server for nodeflow.
pub struct ApiServer {
    state: Arc<AppState>,
    shutdown: CancellationToken,
}

impl ApiServer {
    /// Create a new API server.
    pub fn new(config: ServerConfig, engine: EvaluationEngine) -> Self {
        Self {
            state: Arc::new(AppState::new(engine, config)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Get a reference to the application state.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = self.state.config.socket_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| NodeflowError::Network {
                cause: format!("failed to bind {addr}: {e}"),
            })
    }

    /// Bind and serve until [`shutdown`](Self::shutdown) is called.
    pub async fn run(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let local = listener.local_addr().map_err(|e| NodeflowError::Network {
            cause: e.to_string(),
        })?;
        tracing::info!(addr = %local, "API server started");

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, remote_addr) = match result {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to accept connection");
                            continue;
                        }
                    };

                    let io = TokioIo::new(stream);
                    let state = Arc::clone(&self.state);

                    tokio::spawn(async move {
                        let service = service_fn(move |req| {
                            let state = Arc::clone(&state);
                            async move { router::route(req, state).await }
                        });

                        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                            if !e.is_incomplete_message() {
                                tracing::warn!(
                                    remote = %remote_addr,
                                    error = %e,
                                    "HTTP connection error"
                                );
                            }
                        }
                    });
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("API server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Stop accepting connections. In-flight requests run to completion.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Token that stops the server when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
        assert!(config.evaluation_timeout().is_none());
    }

    #[test]
    fn server_config_socket_addr() {
        let addr = ServerConfig::new("127.0.0.1", 9000).socket_addr();
        assert_eq!(addr.port(), 9000);
        assert_eq!(addr.ip().to_string(), "127.0.0.1");

        let addr = ServerConfig::new("localhost", 1).socket_addr();
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn builder() {
        let config = ServerConfig::new("127.0.0.1", 0)
            .with_max_body_bytes(64)
            .with_evaluation_timeout_ms(500);
        assert_eq!(config.max_body_bytes, 64);
        assert_eq!(config.evaluation_timeout(), Some(Duration::from_millis(500)));
    }
}
