//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use backend::domain::JourneyEngineConfig;
use backend::outbound::map_matching::MapboxMatchingSource;
use backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) engine: JourneyEngineConfig,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) map_matching: Option<MapboxMatchingSource>,
}

impl ServerConfig {
    /// Construct a server configuration with fixture-backed ports.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, engine: JourneyEngineConfig) -> Self {
        Self {
            bind_addr,
            engine,
            db_pool: None,
            map_matching: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool the storage and directory ports fall back to fixtures.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the map-matching adapter.
    #[must_use]
    pub fn with_map_matching(mut self, source: MapboxMatchingSource) -> Self {
        self.map_matching = Some(source);
        self
    }
}
