//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every journey, telemetry, and health endpoint plus the
//! error schemas that keep domain types free of utoipa derives. The document
//! is served by Swagger UI in debug builds and exported by `openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::journeys::ListJourneysQuery;
use crate::inbound::http::journeys_dto::{
    DeleteJourneyResponseBody, JourneyBody, JourneyDetailResponseBody, JourneyListResponseBody,
    LocationHistoryResponseBody, LocationPointBody, MatchJourneyResponseBody,
    PowerHistoryResponseBody, PowerReadingBody, PowerSummaryBody, RouteGeometryBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::telemetry::{LocationHistoryQuery, PowerHistoryQuery};

/// Describe the gateway-forwarded identity header used by mutating routes.
struct GatewayIdentityAddon;

impl Modify for GatewayIdentityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "GatewayIdentity",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "x-authenticated-email",
                "Verified caller email forwarded by the authenticating gateway.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&GatewayIdentityAddon),
    info(
        title = "Journeys backend API",
        description = "Journey history, location and power telemetry, map matching, and journey deletion for tracked devices."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::journeys::list_journeys,
        crate::inbound::http::journeys::get_journey,
        crate::inbound::http::journeys::delete_journey,
        crate::inbound::http::journeys::match_journey,
        crate::inbound::http::telemetry::list_locations,
        crate::inbound::http::telemetry::list_power_readings,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        JourneyBody,
        JourneyListResponseBody,
        JourneyDetailResponseBody,
        LocationPointBody,
        PowerSummaryBody,
        PowerReadingBody,
        RouteGeometryBody,
        MatchJourneyResponseBody,
        DeleteJourneyResponseBody,
        LocationHistoryResponseBody,
        PowerHistoryResponseBody,
        ListJourneysQuery,
        LocationHistoryQuery,
        PowerHistoryQuery,
    )),
    tags(
        (name = "journeys", description = "Journey listing, detail, map matching, and deletion"),
        (name = "telemetry", description = "Location and power history"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    use super::*;

    fn schema_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema for {name}"),
        }
    }

    #[rstest]
    #[case("/api/v1/devices/{serial}/journeys")]
    #[case("/api/v1/devices/{serial}/journeys/{journeyId}")]
    #[case("/api/v1/devices/{serial}/journeys/{journeyId}/match")]
    #[case("/api/v1/devices/{serial}/locations")]
    #[case("/api/v1/devices/{serial}/power")]
    #[case("/health/ready")]
    #[case("/health/live")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn error_schema_uses_camel_case() {
        let fields = schema_fields("crate.domain.Error");
        assert!(fields.iter().any(|field| field == "traceId"));
        assert!(fields.iter().any(|field| field == "details"));
    }

    #[rstest]
    fn delete_response_reports_deleted_points() {
        let fields = schema_fields("DeleteJourneyResponseBody");
        assert_eq!(fields, vec!["deletedPoints".to_owned(), "journeyId".to_owned()]);
    }
}
