//! Port for power-monitor telemetry partitioned by device identity.

use async_trait::async_trait;

use crate::domain::{IdentityId, PartitionQuery, PowerReading};

use super::define_port_error;

define_port_error! {
    /// Errors raised by power reading repository adapters.
    pub enum PowerReadingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "power reading repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "power reading repository query failed: {message}",
    }
}

/// Port for scanning power readings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PowerReadingRepository: Send + Sync {
    /// Scan one identity's readings, applying the query's filters, order, and
    /// limit.
    async fn query(
        &self,
        identity: &IdentityId,
        query: &PartitionQuery,
    ) -> Result<Vec<PowerReading>, PowerReadingRepositoryError>;
}

/// Fixture repository with no telemetry.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePowerReadingRepository;

#[async_trait]
impl PowerReadingRepository for FixturePowerReadingRepository {
    async fn query(
        &self,
        _identity: &IdentityId,
        _query: &PartitionQuery,
    ) -> Result<Vec<PowerReading>, PowerReadingRepositoryError> {
        Ok(Vec::new())
    }
}
