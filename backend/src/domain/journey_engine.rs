//! Port bundle, limits, and error mapping shared by the journey services.

use std::sync::Arc;

use tracing::debug;

use crate::domain::ports::{
    IdentityResolver, IdentityResolverError, JourneyRepository, JourneyRepositoryError,
    LocationRepository, LocationRepositoryError, MAX_DELETE_BATCH, MAX_MATCH_COORDINATES,
    MIN_MATCH_COORDINATES, MapMatchingSource, OwnershipLookup, OwnershipLookupError,
    PowerReadingRepository, PowerReadingRepositoryError,
};
use crate::domain::{DeviceIdentities, Error, PartitionQueryError, SerialNumber};

/// Port bundle required by the journey services.
#[derive(Clone)]
pub struct JourneyEnginePorts {
    /// Serial number to identity directory.
    pub identities: Arc<dyn IdentityResolver>,
    /// Device ownership directory.
    pub ownership: Arc<dyn OwnershipLookup>,
    /// Journey record partitions.
    pub journeys: Arc<dyn JourneyRepository>,
    /// Location point partitions.
    pub locations: Arc<dyn LocationRepository>,
    /// Power-monitor telemetry partitions.
    pub power_readings: Arc<dyn PowerReadingRepository>,
    /// Outbound map-matching provider.
    pub map_matching: Arc<dyn MapMatchingSource>,
}

/// Request limits and batch sizes applied by the journey services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyEngineConfig {
    /// Journeys returned when a list request omits `limit`.
    pub default_journey_limit: usize,
    /// Upper bound on a journey list `limit`.
    pub max_journey_limit: usize,
    /// Look-back window when a history request omits `hours`.
    pub default_history_hours: u32,
    /// Default and maximum records for history requests.
    pub default_history_limit: usize,
    /// Coordinate budget accepted by the map-matching provider.
    pub max_match_points: usize,
    /// Location points removed per delete commit.
    pub delete_batch_size: usize,
}

impl Default for JourneyEngineConfig {
    fn default() -> Self {
        Self {
            default_journey_limit: 50,
            max_journey_limit: 500,
            default_history_hours: 24,
            default_history_limit: 1000,
            max_match_points: 100,
            delete_batch_size: MAX_DELETE_BATCH,
        }
    }
}

impl JourneyEngineConfig {
    /// Delete batch size clamped to what the storage engine accepts.
    pub fn effective_delete_batch_size(&self) -> usize {
        self.delete_batch_size.clamp(1, MAX_DELETE_BATCH)
    }

    /// Sampling budget clamped to what the map-matching provider accepts.
    pub fn effective_match_points(&self) -> usize {
        self.max_match_points.clamp(MIN_MATCH_COORDINATES, MAX_MATCH_COORDINATES)
    }

    /// Resolve a journey list limit, rejecting zero.
    pub fn journey_limit(&self, requested: Option<usize>) -> Result<usize, Error> {
        resolve_limit(requested, self.default_journey_limit, self.max_journey_limit)
    }

    /// Resolve a history limit, rejecting zero.
    pub fn history_limit(&self, requested: Option<usize>) -> Result<usize, Error> {
        resolve_limit(requested, self.default_history_limit, self.default_history_limit)
    }

    /// Resolve a history window, rejecting zero hours.
    pub fn history_hours(&self, requested: Option<u32>) -> Result<u32, Error> {
        match requested {
            Some(0) => Err(Error::invalid_request("hours must be at least 1")),
            Some(hours) => Ok(hours),
            None => Ok(self.default_history_hours),
        }
    }
}

fn resolve_limit(requested: Option<usize>, default: usize, max: usize) -> Result<usize, Error> {
    match requested {
        Some(0) => Err(Error::invalid_request("limit must be at least 1")),
        Some(limit) => Ok(limit.min(max)),
        None => Ok(default.min(max)),
    }
}

/// Resolve a serial number or fail with `not_found`.
pub(crate) async fn resolve_device(
    resolver: &dyn IdentityResolver,
    serial_number: &SerialNumber,
) -> Result<DeviceIdentities, Error> {
    let identities = resolver
        .resolve(serial_number)
        .await
        .map_err(map_identity_resolver_error)?
        .ok_or_else(|| Error::not_found(format!("device {serial_number} not found")))?;
    debug!(
        serial = %serial_number,
        primary = %identities.primary(),
        identities = identities.all().len(),
        "resolved device identities"
    );
    Ok(identities)
}

pub(crate) fn map_identity_resolver_error(error: IdentityResolverError) -> Error {
    match error {
        IdentityResolverError::Connection { message } => {
            Error::service_unavailable(format!("identity resolver unavailable: {message}"))
        }
        IdentityResolverError::Query { message } => {
            Error::internal(format!("identity resolver error: {message}"))
        }
    }
}

pub(crate) fn map_ownership_error(error: OwnershipLookupError) -> Error {
    match error {
        OwnershipLookupError::Connection { message } => {
            Error::service_unavailable(format!("ownership lookup unavailable: {message}"))
        }
        OwnershipLookupError::Query { message } => {
            Error::internal(format!("ownership lookup error: {message}"))
        }
    }
}

pub(crate) fn map_journey_repository_error(error: JourneyRepositoryError) -> Error {
    match error {
        JourneyRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("journey repository unavailable: {message}"))
        }
        JourneyRepositoryError::Query { message } => {
            Error::internal(format!("journey repository error: {message}"))
        }
    }
}

pub(crate) fn map_location_repository_error(error: LocationRepositoryError) -> Error {
    match error {
        LocationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("location repository unavailable: {message}"))
        }
        other => Error::internal(format!("location repository error: {other}")),
    }
}

pub(crate) fn map_power_repository_error(error: PowerReadingRepositoryError) -> Error {
    match error {
        PowerReadingRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("power reading repository unavailable: {message}"))
        }
        PowerReadingRepositoryError::Query { message } => {
            Error::internal(format!("power reading repository error: {message}"))
        }
    }
}

pub(crate) fn map_partition_query_error(error: PartitionQueryError) -> Error {
    Error::invalid_request(error.to_string())
}
