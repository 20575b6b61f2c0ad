//! Service configuration loaded via OrthoConfig.
//!
//! Every setting can come from the command line, a configuration file, or a
//! `JOURNEYS_`-prefixed environment variable. Credentials for the map-matching
//! provider are read here and handed to the adapter; nothing caches them
//! process-wide.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::JourneyEngineConfig;
use crate::outbound::map_matching::MapboxMatchingConfig;
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAP_MATCHING_BASE_URL: &str = "https://api.mapbox.com";
const DEFAULT_MAP_MATCHING_PROFILE: &str = "driving";

/// Errors raised while turning raw settings into component configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// No database URL was supplied.
    #[error("JOURNEYS_DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// The bind address did not parse as `host:port`.
    #[error("invalid bind address {value}: {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// The map-matching base URL did not parse.
    #[error("invalid map matching base URL {value}: {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

/// Runtime settings for the journeys service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "JOURNEYS")]
pub struct JourneysSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Map Matching API origin.
    pub map_matching_base_url: Option<String>,
    /// Map Matching routing profile.
    pub map_matching_profile: Option<String>,
    /// Map Matching access token. Matching reports unavailable without it.
    pub map_matching_access_token: Option<String>,
    /// Whole-request timeout for map matching, in seconds.
    #[ortho_config(default = 15)]
    pub map_matching_timeout_secs: u64,
    /// Coordinate budget for one map-matching request, clamped to 2..=100.
    #[ortho_config(default = 100)]
    pub max_match_points: usize,
    /// Location points removed per delete commit.
    #[ortho_config(default = 25)]
    pub delete_batch_size: usize,
    /// Journeys listed when the request omits `limit`.
    #[ortho_config(default = 50)]
    pub default_journey_limit: usize,
    /// Largest accepted journey list `limit`.
    #[ortho_config(default = 500)]
    pub max_journey_limit: usize,
    /// History window when the request omits `hours`.
    #[ortho_config(default = 24)]
    pub default_history_hours: u32,
    /// Default and maximum records for history requests.
    #[ortho_config(default = 1000)]
    pub default_history_limit: usize,
}

impl JourneysSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Database pool settings.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let url = self
            .database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)?;
        Ok(PoolConfig::new(url).with_max_size(self.db_max_connections))
    }

    /// Map-matching adapter settings.
    pub fn map_matching_config(&self) -> Result<MapboxMatchingConfig, SettingsError> {
        let raw = self
            .map_matching_base_url
            .as_deref()
            .unwrap_or(DEFAULT_MAP_MATCHING_BASE_URL);
        let base_url = Url::parse(raw).map_err(|source| SettingsError::InvalidBaseUrl {
            value: raw.to_owned(),
            source,
        })?;
        Ok(MapboxMatchingConfig {
            base_url,
            profile: self
                .map_matching_profile
                .clone()
                .unwrap_or_else(|| DEFAULT_MAP_MATCHING_PROFILE.to_owned()),
            access_token: self.map_matching_access_token.clone(),
            timeout: Duration::from_secs(self.map_matching_timeout_secs),
        })
    }

    /// Limits applied by the journey services.
    pub fn engine_config(&self) -> JourneyEngineConfig {
        JourneyEngineConfig {
            default_journey_limit: self.default_journey_limit,
            max_journey_limit: self.max_journey_limit,
            default_history_hours: self.default_history_hours,
            default_history_limit: self.default_history_limit,
            max_match_points: self.max_match_points,
            delete_batch_size: self.delete_batch_size,
        }
    }
}
