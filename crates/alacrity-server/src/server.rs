//! HTTP serving loop.
//!
//! Binds a TCP listener and feeds accepted connections into the
//! [`App`] dispatcher through Hyper's HTTP/1 connection driver. One task per
//! connection; requests on a connection are processed in order.
//!
//! A dispatch that produces no response parks the service future instead of
//! force-closing: a deliberately incomplete handler chain leaves the
//! connection to the transport's own timeout.

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::app::App;
use crate::config::ServerConfig;

/// Errors from the serving loop.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured bind address did not parse.
    #[error("invalid bind address {addr:?}: {source}")]
    InvalidAddr {
        /// The configured address string.
        addr: String,
        /// The parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// Binding the listener failed.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The resolved socket address.
        addr: SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Accepting a connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),
}

/// The Alacrity HTTP server: an [`App`] plus a serving loop.
pub struct Server {
    app: Arc<App>,
    config: ServerConfig,
}

impl Server {
    /// Creates a server around a configured app.
    ///
    /// When the config enables debug, the app's default error responder is
    /// switched to debug mode; apps with a custom responder should leave the
    /// flag off.
    #[must_use]
    pub fn new(mut app: App, config: ServerConfig) -> Self {
        if config.debug() {
            app.set_debug(true);
        }
        Self {
            app: Arc::new(app),
            config,
        }
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds the configured address and serves until interrupted.
    ///
    /// # Errors
    ///
    /// Returns an error when the address does not parse, the bind fails, or
    /// accepting a connection fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddr {
                addr: self.config.http_addr().to_string(),
                source,
            })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        tracing::info!(%addr, "listening");
        self.run_with_listener(listener).await
    }

    /// Serves connections from an already-bound listener.
    ///
    /// Useful for tests and for binding to port 0.
    ///
    /// # Errors
    ///
    /// Returns an error when accepting a connection fails.
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received");
                    return Ok(());
                }
                accepted = listener.accept() => {
                    let (stream, remote) = accepted.map_err(ServerError::Accept)?;
                    if self.config.set_no_delay() {
                        if let Err(err) = stream.set_nodelay(true) {
                            tracing::debug!(%remote, error = %err, "failed to set TCP_NODELAY");
                        }
                    }
                    let app = Arc::clone(&self.app);
                    tokio::spawn(serve_connection(app, stream, remote));
                }
            }
        }
    }
}

async fn serve_connection(app: Arc<App>, stream: tokio::net::TcpStream, remote: SocketAddr) {
    let io = TokioIo::new(stream);
    let service = service_fn(move |request| {
        let app = Arc::clone(&app);
        async move {
            match app.dispatch(request).await {
                Some(response) => Ok::<_, std::convert::Infallible>(response),
                None => {
                    tracing::debug!("handler chain produced no response; leaving connection open");
                    std::future::pending::<Result<alacrity_core::Response, std::convert::Infallible>>()
                        .await
                }
            }
        }
    });

    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
        tracing::debug!(%remote, error = %err, "connection closed with error");
    }
}
