//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{journeys, locations, power_readings};

/// Row struct for reading from the journeys table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = journeys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct JourneyRow {
    pub identity_id: String,
    pub journey_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: String,
    pub point_count: i32,
    pub total_distance: f64,
    pub matched_route: Option<serde_json::Value>,
    pub match_confidence: Option<f64>,
    pub matched_at: Option<DateTime<Utc>>,
}

/// Changeset writing the cached map-matching result.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = journeys)]
pub(crate) struct MatchedRouteUpdate<'a> {
    pub matched_route: &'a serde_json::Value,
    pub match_confidence: f64,
    pub matched_at: DateTime<Utc>,
}

/// Row struct for reading from the locations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = locations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LocationRow {
    pub identity_id: String,
    pub recorded_at: DateTime<Utc>,
    pub journey_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub velocity: Option<f64>,
    pub bearing: Option<f64>,
    pub distance: Option<f64>,
    pub dop: Option<f64>,
    pub jcount: Option<i32>,
    pub source: String,
}

/// Row struct for reading from the power_readings table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = power_readings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PowerReadingRow {
    pub identity_id: String,
    pub recorded_at: DateTime<Utc>,
    pub milliamp_hours: Option<f64>,
    pub voltage: Option<f64>,
    pub temperature: Option<f64>,
}
