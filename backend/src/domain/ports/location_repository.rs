//! Port for location points partitioned by device identity.

use async_trait::async_trait;

use crate::domain::{IdentityId, JourneyId, LocationKey, LocationPoint, PartitionQuery};

use super::define_port_error;

/// Largest batch a single [`LocationRepository::delete_batch`] call accepts.
pub const MAX_DELETE_BATCH: usize = 25;

define_port_error! {
    /// Errors raised by location repository adapters.
    pub enum LocationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "location repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "location repository query failed: {message}",
        /// Bulk delete exceeded [`MAX_DELETE_BATCH`].
        BatchTooLarge { size: usize } =>
            "location delete batch of {size} exceeds the bulk-write limit",
    }
}

/// Port for reading and deleting location points.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Scan one identity's points, applying the query's filters, order, and
    /// limit.
    async fn query(
        &self,
        identity: &IdentityId,
        query: &PartitionQuery,
    ) -> Result<Vec<LocationPoint>, LocationRepositoryError>;

    /// Fetch every point of one journey through the journey index.
    ///
    /// The index groups points by journey but does not order them.
    async fn list_for_journey(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<Vec<LocationPoint>, LocationRepositoryError>;

    /// Delete up to [`MAX_DELETE_BATCH`] points as one commit, returning how
    /// many rows were removed. Keys that no longer exist are ignored.
    async fn delete_batch(&self, keys: &[LocationKey]) -> Result<usize, LocationRepositoryError>;
}

/// Fixture repository with no stored points.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLocationRepository;

#[async_trait]
impl LocationRepository for FixtureLocationRepository {
    async fn query(
        &self,
        _identity: &IdentityId,
        _query: &PartitionQuery,
    ) -> Result<Vec<LocationPoint>, LocationRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_journey(
        &self,
        _identity: &IdentityId,
        _journey_id: JourneyId,
    ) -> Result<Vec<LocationPoint>, LocationRepositoryError> {
        Ok(Vec::new())
    }

    async fn delete_batch(&self, keys: &[LocationKey]) -> Result<usize, LocationRepositoryError> {
        if keys.len() > MAX_DELETE_BATCH {
            return Err(LocationRepositoryError::batch_too_large(keys.len()));
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::{DateTime, Utc};
    use rstest::rstest;

    use super::*;

    fn key(offset: i64) -> LocationKey {
        LocationKey {
            identity_id: IdentityId::new("id-1").expect("valid identity"),
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000 + offset, 0)
                .expect("valid timestamp"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_rejects_oversized_batches() {
        let keys: Vec<_> = (0..26).map(key).collect();
        let err = FixtureLocationRepository
            .delete_batch(&keys)
            .await
            .expect_err("batch too large");
        assert_eq!(err, LocationRepositoryError::batch_too_large(26_usize));
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_accepts_full_batch() {
        let keys: Vec<_> = (0..25).map(key).collect();
        let deleted = FixtureLocationRepository
            .delete_batch(&keys)
            .await
            .expect("batch within limit");
        assert_eq!(deleted, 0);
    }
}
