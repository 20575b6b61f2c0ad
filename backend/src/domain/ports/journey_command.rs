//! Driving port for journey mutations: map matching and deletion.

use async_trait::async_trait;

use crate::domain::{Caller, Error, JourneyId, RouteGeometry, SerialNumber};

/// Request to map-match one journey's trail and cache the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchJourneyRequest {
    pub serial_number: SerialNumber,
    pub journey_id: JourneyId,
}

/// Outcome of a successful map match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchJourneyResponse {
    pub journey_id: JourneyId,
    pub matched_route: RouteGeometry,
    pub confidence: f64,
    /// Points stored for the journey.
    pub original_points: usize,
    /// Points submitted after sampling.
    pub sampled_points: usize,
}

/// Request to delete one journey and all of its points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteJourneyRequest {
    pub serial_number: SerialNumber,
    pub journey_id: JourneyId,
    /// `None` for unauthenticated requests.
    pub caller: Option<Caller>,
}

/// Outcome of a completed cascading delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteJourneyResponse {
    pub journey_id: JourneyId,
    pub deleted_points: usize,
}

/// Driving port for journey mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JourneyCommand: Send + Sync {
    /// Map-match a journey and overwrite its cached route.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # async fn example() {
    /// use backend::domain::{JourneyId, SerialNumber};
    /// use backend::domain::ports::{FixtureJourneyCommand, JourneyCommand, MatchJourneyRequest};
    ///
    /// let result = FixtureJourneyCommand
    ///     .match_journey(MatchJourneyRequest {
    ///         serial_number: SerialNumber::new("SN-100").expect("serial"),
    ///         journey_id: JourneyId::new(42),
    ///     })
    ///     .await;
    /// assert!(result.is_err());
    /// # }
    /// ```
    async fn match_journey(
        &self,
        request: MatchJourneyRequest,
    ) -> Result<MatchJourneyResponse, Error>;

    /// Delete a journey record and all of its location points.
    async fn delete_journey(
        &self,
        request: DeleteJourneyRequest,
    ) -> Result<DeleteJourneyResponse, Error>;
}

/// Fixture command implementation that knows no journeys.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureJourneyCommand;

#[async_trait]
impl JourneyCommand for FixtureJourneyCommand {
    async fn match_journey(
        &self,
        request: MatchJourneyRequest,
    ) -> Result<MatchJourneyResponse, Error> {
        Err(Error::not_found(format!(
            "journey {} not found",
            request.journey_id
        )))
    }

    async fn delete_journey(
        &self,
        request: DeleteJourneyRequest,
    ) -> Result<DeleteJourneyResponse, Error> {
        Err(Error::not_found(format!(
            "journey {} not found",
            request.journey_id
        )))
    }
}
