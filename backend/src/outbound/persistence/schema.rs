//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//!
//! Every telemetry table is partitioned by `identity_id`: the leading primary
//! key column scopes all reads and writes to one hardware identity.

diesel::table! {
    /// Device provisioning directory.
    devices (identity_id) {
        identity_id -> Text,
        serial_number -> Text,
        /// Registered owner used for destructive-operation checks.
        owner_email -> Nullable<Text>,
        /// Newest provisioning is the device's primary identity.
        provisioned_at -> Timestamptz,
    }
}

diesel::table! {
    /// Journey records keyed by `(identity_id, journey_id)`.
    journeys (identity_id, journey_id) {
        identity_id -> Text,
        /// Unix seconds of the journey start.
        journey_id -> Int8,
        start_time -> Timestamptz,
        end_time -> Nullable<Timestamptz>,
        /// `active` or `completed`.
        status -> Text,
        point_count -> Int4,
        total_distance -> Float8,
        /// Cached GeoJSON `LineString` from map matching.
        matched_route -> Nullable<Jsonb>,
        match_confidence -> Nullable<Float8>,
        matched_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// GPS fixes keyed by `(identity_id, recorded_at)`.
    locations (identity_id, recorded_at) {
        identity_id -> Text,
        recorded_at -> Timestamptz,
        journey_id -> Nullable<Int8>,
        latitude -> Float8,
        longitude -> Float8,
        velocity -> Nullable<Float8>,
        bearing -> Nullable<Float8>,
        distance -> Nullable<Float8>,
        dop -> Nullable<Float8>,
        jcount -> Nullable<Int4>,
        source -> Text,
    }
}

diesel::table! {
    /// Telemetry events keyed by `(identity_id, event_type, recorded_at)`.
    power_readings (identity_id, event_type, recorded_at) {
        identity_id -> Text,
        event_type -> Text,
        recorded_at -> Timestamptz,
        /// Monotonic charge counter; resets on power cycle.
        milliamp_hours -> Nullable<Float8>,
        voltage -> Nullable<Float8>,
        temperature -> Nullable<Float8>,
    }
}
