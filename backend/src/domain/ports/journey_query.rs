//! Driving port for device journey and telemetry reads.
//!
//! Inbound adapters use this port to list a device's journeys, fetch one
//! journey's point trail, and read recent location and power history without
//! knowing how many hardware identities the device has had.

use async_trait::async_trait;

use crate::domain::{
    Error, Journey, JourneyId, JourneyStatus, LocationPoint, LocationSource, PowerReading,
    PowerSummary, SerialNumber,
};

/// Request to list a device's journeys, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListJourneysRequest {
    pub serial_number: SerialNumber,
    pub status: Option<JourneyStatus>,
    /// Falls back to the configured default when absent.
    pub limit: Option<usize>,
}

/// Journeys merged across every identity of a device.
#[derive(Debug, Clone, PartialEq)]
pub struct ListJourneysResponse {
    pub serial_number: SerialNumber,
    pub journeys: Vec<Journey>,
}

impl ListJourneysResponse {
    /// Number of journeys returned.
    pub fn count(&self) -> usize {
        self.journeys.len()
    }
}

/// Request to fetch one journey with its point trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetJourneyRequest {
    pub serial_number: SerialNumber,
    pub journey_id: JourneyId,
}

/// One journey, its points in ascending time order, and its power summary.
#[derive(Debug, Clone, PartialEq)]
pub struct JourneyDetail {
    pub journey: Journey,
    pub points: Vec<LocationPoint>,
    /// `None` when the telemetry window cannot be summarised.
    pub power: Option<PowerSummary>,
}

/// Request for recent location fixes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListLocationsRequest {
    pub serial_number: SerialNumber,
    pub hours: Option<u32>,
    pub source: Option<LocationSource>,
    pub limit: Option<usize>,
}

/// Location fixes merged across identities, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationHistory {
    pub serial_number: SerialNumber,
    pub hours: u32,
    pub locations: Vec<LocationPoint>,
}

/// Request for recent power-monitor readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPowerReadingsRequest {
    pub serial_number: SerialNumber,
    pub hours: Option<u32>,
    pub limit: Option<usize>,
}

/// Power readings merged across identities, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerHistory {
    pub serial_number: SerialNumber,
    pub hours: u32,
    pub readings: Vec<PowerReading>,
}

/// Driving port for journey and telemetry reads.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> Result<(), backend::domain::Error> {
/// use backend::domain::SerialNumber;
/// use backend::domain::ports::{FixtureJourneyQuery, JourneyQuery, ListJourneysRequest};
///
/// let response = FixtureJourneyQuery
///     .list_journeys(ListJourneysRequest {
///         serial_number: SerialNumber::new("SN-100").expect("serial"),
///         status: None,
///         limit: Some(10),
///     })
///     .await?;
/// assert_eq!(response.count(), 0);
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JourneyQuery: Send + Sync {
    /// List journeys across every identity of the device.
    async fn list_journeys(
        &self,
        request: ListJourneysRequest,
    ) -> Result<ListJourneysResponse, Error>;

    /// Fetch one journey with its points and power summary.
    async fn get_journey(&self, request: GetJourneyRequest) -> Result<JourneyDetail, Error>;

    /// List recent location fixes.
    async fn list_locations(&self, request: ListLocationsRequest)
    -> Result<LocationHistory, Error>;

    /// List recent power readings.
    async fn list_power_readings(
        &self,
        request: ListPowerReadingsRequest,
    ) -> Result<PowerHistory, Error>;
}

/// Fixture query implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureJourneyQuery;

#[async_trait]
impl JourneyQuery for FixtureJourneyQuery {
    async fn list_journeys(
        &self,
        request: ListJourneysRequest,
    ) -> Result<ListJourneysResponse, Error> {
        Ok(ListJourneysResponse {
            serial_number: request.serial_number,
            journeys: Vec::new(),
        })
    }

    async fn get_journey(&self, request: GetJourneyRequest) -> Result<JourneyDetail, Error> {
        Err(Error::not_found(format!(
            "journey {} not found",
            request.journey_id
        )))
    }

    async fn list_locations(
        &self,
        request: ListLocationsRequest,
    ) -> Result<LocationHistory, Error> {
        Ok(LocationHistory {
            serial_number: request.serial_number,
            hours: request.hours.unwrap_or(24),
            locations: Vec::new(),
        })
    }

    async fn list_power_readings(
        &self,
        request: ListPowerReadingsRequest,
    ) -> Result<PowerHistory, Error> {
        Ok(PowerHistory {
            serial_number: request.serial_number,
            hours: request.hours.unwrap_or(24),
            readings: Vec::new(),
        })
    }
}
