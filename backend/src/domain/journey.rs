//! Journey, location, and power records.
//!
//! Records are keyed by `(identity_id, …)`. A journey's identifier is the Unix
//! second at which the trip started, so ordering by id orders by recency.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::IdentityId;

/// Start-timestamp-derived journey identifier (Unix seconds).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct JourneyId(i64);

impl JourneyId {
    /// Wrap a raw identifier.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw identifier value.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for JourneyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JourneyId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// Error returned when parsing an unknown enum label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownLabelError {
    kind: &'static str,
    value: String,
}

/// Journey lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStatus {
    /// The device is still reporting points for this trip.
    Active,
    /// The trip has ended.
    Completed,
}

impl JourneyStatus {
    /// Stable storage and wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for JourneyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JourneyStatus {
    type Err = UnknownLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownLabelError {
                kind: "journey status",
                value: other.to_owned(),
            }),
        }
    }
}

/// How a location fix was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// Satellite fix.
    Gps,
    /// Cell-tower estimate.
    Cell,
    /// Cell + Wi-Fi triangulation.
    Triangulation,
    /// Wi-Fi access point estimate.
    Wifi,
}

impl LocationSource {
    /// Stable storage and wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gps => "gps",
            Self::Cell => "cell",
            Self::Triangulation => "triangulation",
            Self::Wifi => "wifi",
        }
    }
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationSource {
    type Err = UnknownLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "gps" => Ok(Self::Gps),
            "cell" => Ok(Self::Cell),
            "triangulation" => Ok(Self::Triangulation),
            "wifi" => Ok(Self::Wifi),
            other => Err(UnknownLabelError {
                kind: "location source",
                value: other.to_owned(),
            }),
        }
    }
}

/// GeoJSON `LineString` geometry returned by map matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    /// Always `LineString`.
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// `[longitude, latitude]` pairs.
    pub coordinates: Vec<[f64; 2]>,
}

impl RouteGeometry {
    /// GeoJSON type tag for line strings.
    pub const LINE_STRING: &'static str = "LineString";

    /// Build a line string from `[lon, lat]` pairs.
    pub fn line_string(coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            geometry_type: Self::LINE_STRING.to_owned(),
            coordinates,
        }
    }
}

/// Cached output of map matching, written back onto the journey record.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRoute {
    pub geometry: RouteGeometry,
    pub confidence: f64,
    pub matched_at: DateTime<Utc>,
}

/// A bounded trip recorded by one device identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Journey {
    pub identity_id: IdentityId,
    pub journey_id: JourneyId,
    pub start_time: DateTime<Utc>,
    /// `None` while the journey is still active.
    pub end_time: Option<DateTime<Utc>>,
    pub status: JourneyStatus,
    pub point_count: u32,
    /// Metres travelled.
    pub total_distance: f64,
    pub matched_route: Option<MatchedRoute>,
}

/// One GPS fix belonging to an identity and, optionally, a journey.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPoint {
    pub identity_id: IdentityId,
    pub timestamp: DateTime<Utc>,
    pub journey_id: Option<JourneyId>,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres per second.
    pub velocity: Option<f64>,
    /// Degrees from north.
    pub bearing: Option<f64>,
    /// Metres from the previous fix.
    pub distance: Option<f64>,
    /// GPS dilution of precision.
    pub dop: Option<f64>,
    /// Sequence number within the journey.
    pub jcount: Option<u32>,
    pub source: LocationSource,
}

impl LocationPoint {
    /// Storage key of this point within its identity partition.
    pub fn key(&self) -> LocationKey {
        LocationKey {
            identity_id: self.identity_id.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Primary key of a stored location point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub identity_id: IdentityId,
    pub timestamp: DateTime<Utc>,
}

/// One power-monitor sample.
///
/// `milliamp_hours` is a monotonically increasing hardware counter that can
/// reset to near zero when the monitor is power cycled.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerReading {
    pub identity_id: IdentityId,
    pub timestamp: DateTime<Utc>,
    pub milliamp_hours: Option<f64>,
    pub voltage: Option<f64>,
    pub temperature: Option<f64>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for journey record primitives.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("active", JourneyStatus::Active)]
    #[case(" completed ", JourneyStatus::Completed)]
    fn status_parses_labels(#[case] raw: &str, #[case] expected: JourneyStatus) {
        assert_eq!(raw.parse::<JourneyStatus>(), Ok(expected));
    }

    #[rstest]
    fn status_rejects_unknown_labels() {
        let error = "paused".parse::<JourneyStatus>().expect_err("unknown label");
        assert!(error.to_string().contains("paused"));
    }

    #[rstest]
    #[case("gps", LocationSource::Gps)]
    #[case("cell", LocationSource::Cell)]
    #[case("triangulation", LocationSource::Triangulation)]
    #[case("wifi", LocationSource::Wifi)]
    fn source_labels_round_trip(#[case] raw: &str, #[case] expected: LocationSource) {
        let parsed = raw.parse::<LocationSource>().expect("known label");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_str(), raw);
    }

    #[rstest]
    fn journey_ids_order_by_start_time() {
        let earlier = JourneyId::new(1_700_000_000);
        let later: JourneyId = "1700000600".parse().expect("numeric id");
        assert!(later > earlier);
    }

    #[rstest]
    fn route_geometry_serialises_as_geojson() {
        let geometry = RouteGeometry::line_string(vec![[-3.2, 55.9], [-3.1, 55.95]]);
        let value = serde_json::to_value(&geometry).expect("serialise geometry");
        assert_eq!(value["type"], "LineString");
        assert_eq!(value["coordinates"][1][0], -3.1);
    }
}
