//! Location and power history handlers.
//!
//! ```text
//! GET /api/v1/devices/{serial}/locations?hours=&source=&limit=
//! GET /api/v1/devices/{serial}/power?hours=&limit=
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{ListLocationsRequest, ListPowerReadingsRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::journeys_dto::{
    DevicePath, LocationHistoryResponseBody, PowerHistoryResponseBody,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_source, parse_serial_number};

/// Query parameters for location history.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LocationHistoryQuery {
    /// Look-back window in hours. Defaults to 24.
    pub hours: Option<u32>,
    /// `gps`, `cell`, `triangulation`, or `wifi`.
    pub source: Option<String>,
    /// Maximum number of fixes across all identities.
    pub limit: Option<usize>,
}

/// Query parameters for power history.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PowerHistoryQuery {
    /// Look-back window in hours. Defaults to 24.
    pub hours: Option<u32>,
    /// Maximum number of readings across all identities.
    pub limit: Option<usize>,
}

/// Recent location fixes for a device, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/devices/{serial}/locations",
    params(
        ("serial" = String, Path, description = "Device serial number"),
        LocationHistoryQuery
    ),
    responses(
        (status = 200, description = "Location history", body = LocationHistoryResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown device", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["telemetry"],
    operation_id = "listLocations"
)]
#[get("/devices/{serial}/locations")]
pub async fn list_locations(
    state: web::Data<HttpState>,
    path: web::Path<DevicePath>,
    query: web::Query<LocationHistoryQuery>,
) -> ApiResult<web::Json<LocationHistoryResponseBody>> {
    let serial_number = parse_serial_number(path.into_inner().serial, FieldName::new("serial"))?;
    let query = query.into_inner();
    let source = parse_optional_source(query.source, FieldName::new("source"))?;

    let history = state
        .journeys_query
        .list_locations(ListLocationsRequest {
            serial_number,
            hours: query.hours,
            source,
            limit: query.limit,
        })
        .await?;

    Ok(web::Json(LocationHistoryResponseBody::from(history)))
}

/// Recent power-monitor readings for a device, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/devices/{serial}/power",
    params(
        ("serial" = String, Path, description = "Device serial number"),
        PowerHistoryQuery
    ),
    responses(
        (status = 200, description = "Power history", body = PowerHistoryResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown device", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["telemetry"],
    operation_id = "listPowerReadings"
)]
#[get("/devices/{serial}/power")]
pub async fn list_power_readings(
    state: web::Data<HttpState>,
    path: web::Path<DevicePath>,
    query: web::Query<PowerHistoryQuery>,
) -> ApiResult<web::Json<PowerHistoryResponseBody>> {
    let serial_number = parse_serial_number(path.into_inner().serial, FieldName::new("serial"))?;
    let query = query.into_inner();

    let history = state
        .journeys_query
        .list_power_readings(ListPowerReadingsRequest {
            serial_number,
            hours: query.hours,
            limit: query.limit,
        })
        .await?;

    Ok(web::Json(PowerHistoryResponseBody::from(history)))
}
