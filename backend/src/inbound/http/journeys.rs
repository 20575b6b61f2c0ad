//! Journey HTTP handlers.
//!
//! ```text
//! GET    /api/v1/devices/{serial}/journeys?status=&limit=
//! GET    /api/v1/devices/{serial}/journeys/{journeyId}
//! DELETE /api/v1/devices/{serial}/journeys/{journeyId}
//! POST   /api/v1/devices/{serial}/journeys/{journeyId}/match
//! ```

use actix_web::{delete, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    DeleteJourneyRequest, GetJourneyRequest, ListJourneysRequest, MatchJourneyRequest,
};
use crate::domain::{Error, JourneyId, SerialNumber};
use crate::inbound::http::ApiResult;
use crate::inbound::http::caller::CallerContext;
use crate::inbound::http::journeys_dto::{
    DeleteJourneyResponseBody, DevicePath, JourneyDetailResponseBody, JourneyListResponseBody,
    JourneyPath, MatchJourneyResponseBody,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_journey_id, parse_optional_status, parse_serial_number,
};

/// Query parameters for journey listing.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListJourneysQuery {
    /// `active` or `completed`.
    pub status: Option<String>,
    /// Maximum number of journeys across all identities.
    pub limit: Option<usize>,
}

fn parse_journey_path(path: JourneyPath) -> Result<(SerialNumber, JourneyId), Error> {
    let journey_id = parse_journey_id(&path.journey_id, FieldName::new("journeyId"))?;
    let serial_number = parse_serial_number(path.serial, FieldName::new("serial"))?;
    Ok((serial_number, journey_id))
}

/// List a device's journeys, newest first, across all of its identities.
#[utoipa::path(
    get,
    path = "/api/v1/devices/{serial}/journeys",
    params(
        ("serial" = String, Path, description = "Device serial number"),
        ListJourneysQuery
    ),
    responses(
        (status = 200, description = "Journeys", body = JourneyListResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown device", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["journeys"],
    operation_id = "listJourneys"
)]
#[get("/devices/{serial}/journeys")]
pub async fn list_journeys(
    state: web::Data<HttpState>,
    path: web::Path<DevicePath>,
    query: web::Query<ListJourneysQuery>,
) -> ApiResult<web::Json<JourneyListResponseBody>> {
    let serial_number = parse_serial_number(path.into_inner().serial, FieldName::new("serial"))?;
    let query = query.into_inner();
    let status = parse_optional_status(query.status, FieldName::new("status"))?;

    let response = state
        .journeys_query
        .list_journeys(ListJourneysRequest {
            serial_number,
            status,
            limit: query.limit,
        })
        .await?;

    Ok(web::Json(JourneyListResponseBody::from(response)))
}

/// Fetch a journey with its ordered point trail and power summary.
#[utoipa::path(
    get,
    path = "/api/v1/devices/{serial}/journeys/{journeyId}",
    params(
        ("serial" = String, Path, description = "Device serial number"),
        ("journeyId" = i64, Path, description = "Journey identifier")
    ),
    responses(
        (status = 200, description = "Journey detail", body = JourneyDetailResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown device or journey", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["journeys"],
    operation_id = "getJourney"
)]
#[get("/devices/{serial}/journeys/{journeyId}")]
pub async fn get_journey(
    state: web::Data<HttpState>,
    path: web::Path<JourneyPath>,
) -> ApiResult<web::Json<JourneyDetailResponseBody>> {
    let (serial_number, journey_id) = parse_journey_path(path.into_inner())?;

    let detail = state
        .journeys_query
        .get_journey(GetJourneyRequest {
            serial_number,
            journey_id,
        })
        .await?;

    Ok(web::Json(JourneyDetailResponseBody::from(detail)))
}

/// Delete a journey and all of its location points.
///
/// Only administrators and the registered owner of the device may delete.
#[utoipa::path(
    delete,
    path = "/api/v1/devices/{serial}/journeys/{journeyId}",
    params(
        ("serial" = String, Path, description = "Device serial number"),
        ("journeyId" = i64, Path, description = "Journey identifier"),
        ("x-authenticated-email" = Option<String>, Header, description = "Verified caller email"),
        ("x-authenticated-groups" = Option<String>, Header, description = "Comma-separated caller groups")
    ),
    responses(
        (status = 200, description = "Journey deleted", body = DeleteJourneyResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "No authenticated caller", body = ErrorSchema),
        (status = 403, description = "Caller may not delete this journey", body = ErrorSchema),
        (status = 404, description = "Unknown device or journey", body = ErrorSchema),
        (status = 503, description = "Service unavailable; details carry deletedPoints", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["journeys"],
    operation_id = "deleteJourney"
)]
#[delete("/devices/{serial}/journeys/{journeyId}")]
pub async fn delete_journey(
    state: web::Data<HttpState>,
    caller: CallerContext,
    path: web::Path<JourneyPath>,
) -> ApiResult<web::Json<DeleteJourneyResponseBody>> {
    let (serial_number, journey_id) = parse_journey_path(path.into_inner())?;

    let response = state
        .journeys_command
        .delete_journey(DeleteJourneyRequest {
            serial_number,
            journey_id,
            caller: caller.into_inner(),
        })
        .await?;
    info!(
        journey_id = %response.journey_id,
        deleted = response.deleted_points,
        "journey deleted"
    );

    Ok(web::Json(DeleteJourneyResponseBody::from(response)))
}

/// Snap the journey's trail onto the road network and cache the result.
#[utoipa::path(
    post,
    path = "/api/v1/devices/{serial}/journeys/{journeyId}/match",
    params(
        ("serial" = String, Path, description = "Device serial number"),
        ("journeyId" = i64, Path, description = "Journey identifier")
    ),
    responses(
        (status = 200, description = "Matched route", body = MatchJourneyResponseBody),
        (status = 400, description = "Too few points or invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown device or journey", body = ErrorSchema),
        (status = 502, description = "Map matching failed", body = ErrorSchema),
        (status = 503, description = "Map matching not configured or unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["journeys"],
    operation_id = "matchJourney"
)]
#[post("/devices/{serial}/journeys/{journeyId}/match")]
pub async fn match_journey(
    state: web::Data<HttpState>,
    path: web::Path<JourneyPath>,
) -> ApiResult<web::Json<MatchJourneyResponseBody>> {
    let (serial_number, journey_id) = parse_journey_path(path.into_inner())?;

    let response = state
        .journeys_command
        .match_journey(MatchJourneyRequest {
            serial_number,
            journey_id,
        })
        .await?;

    Ok(web::Json(MatchJourneyResponseBody::from(response)))
}

#[cfg(test)]
#[path = "journeys_tests.rs"]
mod tests;
