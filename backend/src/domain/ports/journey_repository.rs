//! Port for journey records partitioned by device identity.

use async_trait::async_trait;

use crate::domain::{IdentityId, Journey, JourneyId, MatchedRoute, PartitionQuery};

use super::define_port_error;

define_port_error! {
    /// Errors raised by journey repository adapters.
    pub enum JourneyRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "journey repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "journey repository query failed: {message}",
    }
}

/// Port for reading and mutating journey records.
///
/// Every operation is scoped to a single identity partition; callers that
/// need a device-wide view fan out across identities themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JourneyRepository: Send + Sync {
    /// Scan one identity's journeys, applying the query's filters, order, and
    /// limit.
    async fn query(
        &self,
        identity: &IdentityId,
        query: &PartitionQuery,
    ) -> Result<Vec<Journey>, JourneyRepositoryError>;

    /// Fetch one journey by key.
    async fn find(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<Option<Journey>, JourneyRepositoryError>;

    /// Overwrite the cached matched route. Returns `false` when the journey
    /// no longer exists.
    async fn save_matched_route(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
        route: &MatchedRoute,
    ) -> Result<bool, JourneyRepositoryError>;

    /// Remove a journey record. Returns `false` when nothing was removed.
    async fn delete(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<bool, JourneyRepositoryError>;
}

/// Fixture repository with no stored journeys.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureJourneyRepository;

#[async_trait]
impl JourneyRepository for FixtureJourneyRepository {
    async fn query(
        &self,
        _identity: &IdentityId,
        _query: &PartitionQuery,
    ) -> Result<Vec<Journey>, JourneyRepositoryError> {
        Ok(Vec::new())
    }

    async fn find(
        &self,
        _identity: &IdentityId,
        _journey_id: JourneyId,
    ) -> Result<Option<Journey>, JourneyRepositoryError> {
        Ok(None)
    }

    async fn save_matched_route(
        &self,
        _identity: &IdentityId,
        _journey_id: JourneyId,
        _route: &MatchedRoute,
    ) -> Result<bool, JourneyRepositoryError> {
        Ok(false)
    }

    async fn delete(
        &self,
        _identity: &IdentityId,
        _journey_id: JourneyId,
    ) -> Result<bool, JourneyRepositoryError> {
        Ok(false)
    }
}
