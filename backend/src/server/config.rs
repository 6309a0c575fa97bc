//! HTTP server configuration object.

use actix_web::cookie::{Key, SameSite};
use qna_backend::outbound::persistence::DbPool;
use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) admin_endpoints: bool,
}

impl ServerConfig {
    /// Construct a server configuration with the operator surface disabled.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        db_pool: DbPool,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool,
            admin_endpoints: false,
        }
    }

    /// Mount the `/api/v1/migration` operator endpoints.
    #[must_use]
    pub fn with_admin_endpoints(mut self, enabled: bool) -> Self {
        self.admin_endpoints = enabled;
        self
    }
}
