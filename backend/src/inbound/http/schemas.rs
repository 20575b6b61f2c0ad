//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The gateway forwarded no authenticated caller.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The caller is neither an administrator nor the device owner.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The device or journey does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with the current state of the resource.
    #[schema(rename = "conflict")]
    Conflict,
    /// The map-matching service rejected or failed the request.
    #[schema(rename = "upstream_failure")]
    UpstreamFailure,
    /// A dependency is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "not_found")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "journey 1767225600000 not found")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "7b0c8c3e-5f4a-4d43-9a55-0f6f2c1d9e11")]
    trace_id: Option<String>,
    /// Supplementary error details, such as the upstream map-matching code.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use utoipa::PartialSchema;

    use super::*;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_schema_uses_wire_field_names() {
        let schema_json = schema_to_json::<ErrorSchema>();
        // utoipa replaces :: with . in schema names
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        assert!(schema_json.contains("traceId"), "{schema_json}");
        assert!(!schema_json.contains("trace_id"), "{schema_json}");
    }

    #[rstest]
    #[case("invalid_request")]
    #[case("unauthorized")]
    #[case("forbidden")]
    #[case("not_found")]
    #[case("conflict")]
    #[case("upstream_failure")]
    #[case("service_unavailable")]
    #[case("internal_error")]
    fn error_code_schema_lists_every_code(#[case] code: &str) {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        assert!(schema_json.contains(code), "missing {code}");
    }
}
