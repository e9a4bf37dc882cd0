//! HTTP server configuration object and helpers.

use registration::settings::RegistrationConfig;
use std::net::SocketAddr;

/// Configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) registration: RegistrationConfig,
}

impl ServerConfig {
    /// Construct a server configuration from validated settings.
    #[must_use]
    pub fn new(registration: RegistrationConfig) -> Self {
        Self {
            bind_addr: registration.bind_addr,
            registration,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
