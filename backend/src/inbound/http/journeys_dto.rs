//! JSON bodies for the journey and telemetry endpoints.
//!
//! Domain records are converted at the edge so the wire format (camelCase,
//! RFC 3339 timestamps, GeoJSON geometry) stays an adapter concern.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    DeleteJourneyResponse, JourneyDetail, ListJourneysResponse, LocationHistory,
    MatchJourneyResponse, PowerHistory,
};
use crate::domain::{Journey, LocationPoint, PowerReading, PowerSummary, RouteGeometry};

/// Path parameters addressing a device.
#[derive(Debug, Deserialize)]
pub struct DevicePath {
    pub serial: String,
}

/// Path parameters addressing one journey of a device.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyPath {
    pub serial: String,
    pub journey_id: String,
}

/// GeoJSON `LineString` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RouteGeometryBody {
    #[serde(rename = "type")]
    #[schema(example = "LineString")]
    pub geometry_type: String,
    /// `[longitude, latitude]` pairs.
    #[schema(value_type = Vec<Vec<f64>>)]
    pub coordinates: Vec<[f64; 2]>,
}

impl From<RouteGeometry> for RouteGeometryBody {
    fn from(value: RouteGeometry) -> Self {
        Self {
            geometry_type: value.geometry_type,
            coordinates: value.coordinates,
        }
    }
}

/// Journey metadata, including any cached map-matching result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JourneyBody {
    pub identity_id: String,
    #[schema(example = 1_767_225_600_000_i64)]
    pub journey_id: i64,
    #[schema(format = "date-time")]
    pub start_time: String,
    #[schema(format = "date-time")]
    pub end_time: Option<String>,
    #[schema(example = "completed")]
    pub status: String,
    pub point_count: u32,
    /// Metres travelled.
    pub total_distance: f64,
    pub matched_route: Option<RouteGeometryBody>,
    pub match_confidence: Option<f64>,
    #[schema(format = "date-time")]
    pub matched_at: Option<String>,
}

impl From<Journey> for JourneyBody {
    fn from(value: Journey) -> Self {
        let (matched_route, match_confidence, matched_at) = match value.matched_route {
            Some(route) => (
                Some(RouteGeometryBody::from(route.geometry)),
                Some(route.confidence),
                Some(route.matched_at.to_rfc3339()),
            ),
            None => (None, None, None),
        };
        Self {
            identity_id: value.identity_id.to_string(),
            journey_id: value.journey_id.value(),
            start_time: value.start_time.to_rfc3339(),
            end_time: value.end_time.map(|time| time.to_rfc3339()),
            status: value.status.as_str().to_owned(),
            point_count: value.point_count,
            total_distance: value.total_distance,
            matched_route,
            match_confidence,
            matched_at,
        }
    }
}

/// One location fix.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationPointBody {
    pub identity_id: String,
    #[schema(format = "date-time")]
    pub timestamp: String,
    pub journey_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub velocity: Option<f64>,
    pub bearing: Option<f64>,
    pub distance: Option<f64>,
    pub dop: Option<f64>,
    pub jcount: Option<u32>,
    #[schema(example = "gps")]
    pub source: String,
}

impl From<LocationPoint> for LocationPointBody {
    fn from(value: LocationPoint) -> Self {
        Self {
            identity_id: value.identity_id.to_string(),
            timestamp: value.timestamp.to_rfc3339(),
            journey_id: value.journey_id.map(|id| id.value()),
            latitude: value.latitude,
            longitude: value.longitude,
            velocity: value.velocity,
            bearing: value.bearing,
            distance: value.distance,
            dop: value.dop,
            jcount: value.jcount,
            source: value.source.as_str().to_owned(),
        }
    }
}

/// Charge consumed over a journey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PowerSummaryBody {
    pub start_mah: f64,
    pub end_mah: f64,
    pub consumed_mah: f64,
    pub reading_count: usize,
}

impl From<PowerSummary> for PowerSummaryBody {
    fn from(value: PowerSummary) -> Self {
        Self {
            start_mah: value.start_mah,
            end_mah: value.end_mah,
            consumed_mah: value.consumed_mah,
            reading_count: value.reading_count,
        }
    }
}

/// One power-monitor sample.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PowerReadingBody {
    pub identity_id: String,
    #[schema(format = "date-time")]
    pub timestamp: String,
    pub milliamp_hours: Option<f64>,
    pub voltage: Option<f64>,
    pub temperature: Option<f64>,
}

impl From<PowerReading> for PowerReadingBody {
    fn from(value: PowerReading) -> Self {
        Self {
            identity_id: value.identity_id.to_string(),
            timestamp: value.timestamp.to_rfc3339(),
            milliamp_hours: value.milliamp_hours,
            voltage: value.voltage,
            temperature: value.temperature,
        }
    }
}

/// Response payload for journey listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JourneyListResponseBody {
    pub serial_number: String,
    pub count: usize,
    pub journeys: Vec<JourneyBody>,
}

impl From<ListJourneysResponse> for JourneyListResponseBody {
    fn from(value: ListJourneysResponse) -> Self {
        let count = value.count();
        Self {
            serial_number: value.serial_number.to_string(),
            count,
            journeys: value.journeys.into_iter().map(JourneyBody::from).collect(),
        }
    }
}

/// Response payload for journey detail.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JourneyDetailResponseBody {
    pub journey: JourneyBody,
    /// Location fixes in ascending timestamp order.
    pub points: Vec<LocationPointBody>,
    /// `null` when the window holds too few readings or the counter reset.
    pub power: Option<PowerSummaryBody>,
}

impl From<JourneyDetail> for JourneyDetailResponseBody {
    fn from(value: JourneyDetail) -> Self {
        Self {
            journey: JourneyBody::from(value.journey),
            points: value
                .points
                .into_iter()
                .map(LocationPointBody::from)
                .collect(),
            power: value.power.map(PowerSummaryBody::from),
        }
    }
}

/// Response payload for a map-matching run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchJourneyResponseBody {
    pub journey_id: i64,
    pub matched_route: RouteGeometryBody,
    pub confidence: f64,
    pub original_points: usize,
    pub sampled_points: usize,
}

impl From<MatchJourneyResponse> for MatchJourneyResponseBody {
    fn from(value: MatchJourneyResponse) -> Self {
        Self {
            journey_id: value.journey_id.value(),
            matched_route: RouteGeometryBody::from(value.matched_route),
            confidence: value.confidence,
            original_points: value.original_points,
            sampled_points: value.sampled_points,
        }
    }
}

/// Response payload for journey deletion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteJourneyResponseBody {
    pub journey_id: i64,
    pub deleted_points: usize,
}

impl From<DeleteJourneyResponse> for DeleteJourneyResponseBody {
    fn from(value: DeleteJourneyResponse) -> Self {
        Self {
            journey_id: value.journey_id.value(),
            deleted_points: value.deleted_points,
        }
    }
}

/// Response payload for location history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationHistoryResponseBody {
    pub serial_number: String,
    pub hours: u32,
    pub count: usize,
    pub locations: Vec<LocationPointBody>,
}

impl From<LocationHistory> for LocationHistoryResponseBody {
    fn from(value: LocationHistory) -> Self {
        Self {
            serial_number: value.serial_number.to_string(),
            hours: value.hours,
            count: value.locations.len(),
            locations: value
                .locations
                .into_iter()
                .map(LocationPointBody::from)
                .collect(),
        }
    }
}

/// Response payload for power history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PowerHistoryResponseBody {
    pub serial_number: String,
    pub hours: u32,
    pub count: usize,
    pub readings: Vec<PowerReadingBody>,
}

impl From<PowerHistory> for PowerHistoryResponseBody {
    fn from(value: PowerHistory) -> Self {
        Self {
            serial_number: value.serial_number.to_string(),
            hours: value.hours,
            count: value.readings.len(),
            readings: value
                .readings
                .into_iter()
                .map(PowerReadingBody::from)
                .collect(),
        }
    }
}
