//! Server configuration.
//!
//! Builder-pattern configuration for the HTTP serving loop.

use std::net::SocketAddr;

/// Default HTTP bind address.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:8080";

/// Server configuration.
///
/// # Example
///
/// ```rust
/// use alacrity_server::ServerConfig;
///
/// let config = ServerConfig::builder()
///     .http_addr("127.0.0.1:3000")
///     .set_no_delay(true)
///     .build();
///
/// assert_eq!(config.http_addr(), "127.0.0.1:3000");
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP bind address (e.g., "0.0.0.0:8080")
    http_addr: String,

    /// Whether error responses carry debug detail
    debug: bool,

    /// Whether to set TCP_NODELAY on accepted connections
    set_no_delay: bool,
}

impl ServerConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Returns the HTTP bind address.
    #[must_use]
    pub fn http_addr(&self) -> &str {
        &self.http_addr
    }

    /// Parses and returns the bind address as a `SocketAddr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.http_addr.parse()
    }

    /// Returns whether debug detail is enabled.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Returns whether TCP_NODELAY is set on accepted connections.
    #[must_use]
    pub fn set_no_delay(&self) -> bool {
        self.set_no_delay
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder {
    http_addr: Option<String>,
    debug: bool,
    set_no_delay: bool,
}

impl ServerConfigBuilder {
    /// Sets the HTTP bind address.
    #[must_use]
    pub fn http_addr(mut self, addr: impl Into<String>) -> Self {
        self.http_addr = Some(addr.into());
        self
    }

    /// Enables debug detail in default error responses.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets TCP_NODELAY on accepted connections; cheaper here than toggling
    /// it around individual writes.
    #[must_use]
    pub fn set_no_delay(mut self, set_no_delay: bool) -> Self {
        self.set_no_delay = set_no_delay;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> ServerConfig {
        ServerConfig {
            http_addr: self.http_addr.unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string()),
            debug: self.debug,
            set_no_delay: self.set_no_delay,
        }
    }
}
