//! Driven port for an external map-matching service.
//!
//! The domain owns the request shape and response contract; adapters only
//! translate them to and from the provider's wire format.

use async_trait::async_trait;

use crate::domain::RouteGeometry;

use super::define_port_error;

/// Result code the provider uses for a successful match.
pub const MATCH_OK_CODE: &str = "Ok";

/// Fewest coordinates the provider will match.
pub const MIN_MATCH_COORDINATES: usize = 2;

/// Most coordinates the provider accepts in one request.
pub const MAX_MATCH_COORDINATES: usize = 100;

/// One trajectory submitted for matching. All vectors share one index space.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMatchingRequest {
    /// `[longitude, latitude]` pairs in travel order.
    pub coordinates: Vec<[f64; 2]>,
    /// Unix seconds per coordinate.
    pub timestamps: Vec<i64>,
    /// Search radius in metres per coordinate.
    pub radiuses: Vec<f64>,
}

/// One matched sub-route.
#[derive(Debug, Clone, PartialEq)]
pub struct Matching {
    pub geometry: RouteGeometry,
    pub confidence: f64,
}

/// Provider response, including unsuccessful result codes.
#[derive(Debug, Clone, PartialEq)]
pub struct MapMatchingResponse {
    /// Provider result code; anything other than [`MATCH_OK_CODE`] is a
    /// failed match.
    pub code: String,
    pub matchings: Vec<Matching>,
    pub message: Option<String>,
}

impl MapMatchingResponse {
    /// First matching when the provider reported success with a result.
    pub fn best_match(&self) -> Option<&Matching> {
        if self.code == MATCH_OK_CODE {
            self.matchings.first()
        } else {
            None
        }
    }
}

define_port_error! {
    /// Errors surfaced while calling the map-matching service.
    pub enum MapMatchingSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "map matching transport failed: {message}",
        /// Call exceeded its timeout.
        Timeout { message: String } =>
            "map matching timeout: {message}",
        /// Provider rate-limited the request.
        RateLimited { message: String } =>
            "map matching rate limited request: {message}",
        /// Response body could not be decoded.
        Decode { message: String } =>
            "map matching response decode failed: {message}",
        /// Adapter rejected request before execution.
        InvalidRequest { message: String } =>
            "map matching request invalid: {message}",
        /// No credentials are configured for the provider.
        NotConfigured =>
            "map matching is not configured",
    }
}

/// Port for submitting trajectories to a map-matching provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MapMatchingSource: Send + Sync {
    /// Match one trajectory.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use backend::domain::ports::{
    ///     FixtureMapMatchingSource, MapMatchingRequest, MapMatchingSource,
    /// };
    ///
    /// let response = FixtureMapMatchingSource
    ///     .match_trajectory(&MapMatchingRequest {
    ///         coordinates: vec![[-3.19, 55.95], [-3.18, 55.96]],
    ///         timestamps: vec![1_700_000_000, 1_700_000_060],
    ///         radiuses: vec![25.0, 25.0],
    ///     })
    ///     .await?;
    /// assert!(response.best_match().is_some());
    /// # Ok::<(), backend::domain::ports::MapMatchingSourceError>(())
    /// ```
    async fn match_trajectory(
        &self,
        request: &MapMatchingRequest,
    ) -> Result<MapMatchingResponse, MapMatchingSourceError>;
}

/// Fixture source that echoes the submitted coordinates as the matched line.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureMapMatchingSource;

#[async_trait]
impl MapMatchingSource for FixtureMapMatchingSource {
    async fn match_trajectory(
        &self,
        request: &MapMatchingRequest,
    ) -> Result<MapMatchingResponse, MapMatchingSourceError> {
        Ok(MapMatchingResponse {
            code: MATCH_OK_CODE.to_owned(),
            matchings: vec![Matching {
                geometry: RouteGeometry::line_string(request.coordinates.clone()),
                confidence: 1.0,
            }],
            message: None,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    fn response(code: &str, matchings: usize) -> MapMatchingResponse {
        MapMatchingResponse {
            code: code.to_owned(),
            matchings: (0..matchings)
                .map(|_| Matching {
                    geometry: RouteGeometry::line_string(vec![[0.0, 0.0], [1.0, 1.0]]),
                    confidence: 0.8,
                })
                .collect(),
            message: None,
        }
    }

    #[rstest]
    #[case("Ok", 1, true)]
    #[case("Ok", 0, false)]
    #[case("NoMatch", 1, false)]
    #[case("InvalidInput", 0, false)]
    fn best_match_requires_ok_code_and_a_matching(
        #[case] code: &str,
        #[case] matchings: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(response(code, matchings).best_match().is_some(), expected);
    }

    #[tokio::test]
    async fn fixture_echoes_coordinates() {
        let request = MapMatchingRequest {
            coordinates: vec![[-3.19, 55.95], [-3.18, 55.96]],
            timestamps: vec![1_700_000_000, 1_700_000_060],
            radiuses: vec![25.0, 25.0],
        };

        let response = FixtureMapMatchingSource
            .match_trajectory(&request)
            .await
            .expect("fixture succeeds");

        let best = response.best_match().expect("matching");
        assert_eq!(best.geometry.coordinates, request.coordinates);
    }
}
