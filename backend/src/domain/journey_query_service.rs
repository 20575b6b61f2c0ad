//! Read-side journey service.
//!
//! List and history reads fan out across every identity of a device and
//! merge into one ordering. Detail reads probe for the owning identity, then
//! assemble the point trail and a power summary for the journey's window.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::journey_engine::{
    map_journey_repository_error, map_location_repository_error, map_partition_query_error,
    map_power_repository_error, resolve_device,
};
use crate::domain::journey_locator::require_journey;
use crate::domain::ports::{
    GetJourneyRequest, JourneyDetail, JourneyQuery, ListJourneysRequest, ListJourneysResponse,
    ListLocationsRequest, ListPowerReadingsRequest, LocationHistory, PowerHistory,
};
use crate::domain::{
    Dataset, Error, IdentityId, Journey, JourneyEngineConfig, JourneyEnginePorts, PartitionQuery,
    PowerSummary, QueryFilter, ScanOrder, SortDirection, compute_power_delta, fan_out,
    merge_sorted,
};

/// Journey service implementing the read driving port.
#[derive(Clone)]
pub struct JourneyQueryService {
    ports: JourneyEnginePorts,
    config: JourneyEngineConfig,
    clock: Arc<dyn Clock>,
}

impl JourneyQueryService {
    /// Create a query service over the given ports.
    pub fn new(ports: JourneyEnginePorts, config: JourneyEngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            ports,
            config,
            clock,
        }
    }

    fn since(&self, hours: u32) -> DateTime<Utc> {
        self.clock.utc() - TimeDelta::hours(i64::from(hours))
    }

    async fn power_summary(
        &self,
        identity: &IdentityId,
        journey: &Journey,
    ) -> Result<Option<PowerSummary>, Error> {
        let start = journey.start_time;
        let end = journey.end_time.unwrap_or_else(|| self.clock.utc()).max(start);
        let query = PartitionQuery::builder(Dataset::Telemetry)
            .filter(QueryFilter::TimeRange(start, end))
            .order(ScanOrder::Ascending)
            .build()
            .map_err(map_partition_query_error)?;
        let readings = self
            .ports
            .power_readings
            .query(identity, &query)
            .await
            .map_err(map_power_repository_error)?;
        let summary = compute_power_delta(&readings);
        if summary.is_none() {
            debug!(
                identity = %identity,
                journey_id = %journey.journey_id,
                readings = readings.len(),
                "power window not summarisable"
            );
        }
        Ok(summary)
    }
}

#[async_trait]
impl JourneyQuery for JourneyQueryService {
    async fn list_journeys(
        &self,
        request: ListJourneysRequest,
    ) -> Result<ListJourneysResponse, Error> {
        let limit = self.config.journey_limit(request.limit)?;
        let identities =
            resolve_device(self.ports.identities.as_ref(), &request.serial_number).await?;
        let query = PartitionQuery::builder(Dataset::Journeys)
            .filter_opt(request.status.map(QueryFilter::Status))
            .order(ScanOrder::Descending)
            .limit(limit)
            .build()
            .map_err(map_partition_query_error)?;

        let results = fan_out(Dataset::Journeys, identities.all(), |identity| {
            let journeys = Arc::clone(&self.ports.journeys);
            let query = query.clone();
            async move { journeys.query(&identity, &query).await }
        })
        .await
        .map_err(map_journey_repository_error)?;

        let journeys = merge_sorted(
            results,
            |journey| journey.journey_id,
            SortDirection::Descending,
            limit,
        );
        info!(
            serial = %request.serial_number,
            count = journeys.len(),
            "listed journeys"
        );
        Ok(ListJourneysResponse {
            serial_number: request.serial_number,
            journeys,
        })
    }

    async fn get_journey(&self, request: GetJourneyRequest) -> Result<JourneyDetail, Error> {
        let identities =
            resolve_device(self.ports.identities.as_ref(), &request.serial_number).await?;
        let journey =
            require_journey(self.ports.journeys.as_ref(), &identities, request.journey_id).await?;
        let owner = journey.identity_id.clone();

        let mut points = self
            .ports
            .locations
            .list_for_journey(&owner, journey.journey_id)
            .await
            .map_err(map_location_repository_error)?;
        points.sort_by_key(|point| point.timestamp);

        let power = self.power_summary(&owner, &journey).await?;
        debug!(
            serial = %request.serial_number,
            identity = %owner,
            journey_id = %journey.journey_id,
            points = points.len(),
            has_power = power.is_some(),
            "assembled journey detail"
        );
        Ok(JourneyDetail {
            journey,
            points,
            power,
        })
    }

    async fn list_locations(
        &self,
        request: ListLocationsRequest,
    ) -> Result<LocationHistory, Error> {
        let hours = self.config.history_hours(request.hours)?;
        let limit = self.config.history_limit(request.limit)?;
        let identities =
            resolve_device(self.ports.identities.as_ref(), &request.serial_number).await?;
        let query = PartitionQuery::builder(Dataset::Locations)
            .filter(QueryFilter::Since(self.since(hours)))
            .filter_opt(request.source.map(QueryFilter::Source))
            .order(ScanOrder::Descending)
            .limit(limit)
            .build()
            .map_err(map_partition_query_error)?;

        let results = fan_out(Dataset::Locations, identities.all(), |identity| {
            let locations = Arc::clone(&self.ports.locations);
            let query = query.clone();
            async move { locations.query(&identity, &query).await }
        })
        .await
        .map_err(map_location_repository_error)?;

        let locations = merge_sorted(
            results,
            |point| point.timestamp,
            SortDirection::Descending,
            limit,
        );
        Ok(LocationHistory {
            serial_number: request.serial_number,
            hours,
            locations,
        })
    }

    async fn list_power_readings(
        &self,
        request: ListPowerReadingsRequest,
    ) -> Result<PowerHistory, Error> {
        let hours = self.config.history_hours(request.hours)?;
        let limit = self.config.history_limit(request.limit)?;
        let identities =
            resolve_device(self.ports.identities.as_ref(), &request.serial_number).await?;
        let query = PartitionQuery::builder(Dataset::Telemetry)
            .filter(QueryFilter::Since(self.since(hours)))
            .order(ScanOrder::Descending)
            .limit(limit)
            .build()
            .map_err(map_partition_query_error)?;

        let results = fan_out(Dataset::Telemetry, identities.all(), |identity| {
            let readings = Arc::clone(&self.ports.power_readings);
            let query = query.clone();
            async move { readings.query(&identity, &query).await }
        })
        .await
        .map_err(map_power_repository_error)?;

        let readings = merge_sorted(
            results,
            |reading| reading.timestamp,
            SortDirection::Descending,
            limit,
        );
        Ok(PowerHistory {
            serial_number: request.serial_number,
            hours,
            readings,
        })
    }
}

#[cfg(test)]
#[path = "journey_query_service_tests.rs"]
mod tests;
