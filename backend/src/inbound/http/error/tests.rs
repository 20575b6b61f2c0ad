//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::http::header::{CACHE_CONTROL, HeaderMap};
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[fixture]
fn partial_delete() -> Error {
    Error::service_unavailable("location store unavailable: pool closed")
        .with_details(json!({"deletedPoints": 50, "journeyId": 7}))
        .with_trace_id(TRACE_ID)
}

#[fixture]
fn no_match() -> Error {
    Error::map_matching_failed("NoMatch", "Could not match the trace").with_trace_id(TRACE_ID)
}

async fn render(error: &Error) -> (StatusCode, HeaderMap, Error) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload = serde_json::from_slice(&bytes).expect("error JSON deserialises");
    (status, headers, payload)
}

#[rstest]
#[case(Error::invalid_request("journeyId must be positive"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("login required"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("not the journey owner"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("journey 7 not found"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("journey is still active"), StatusCode::CONFLICT)]
#[case(Error::map_matching_failed("NoMatch", "no route"), StatusCode::BAD_GATEWAY)]
#[case(Error::service_unavailable("map matching not configured"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("row decode failed"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_follows_error_code(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), expected);
    assert_eq!(status_for(error.code()), expected);
}

#[rstest]
#[actix_web::test]
async fn partial_delete_reports_progress_to_the_client(partial_delete: Error) {
    let (status, headers, payload) = render(&partial_delete).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        headers.get(TRACE_ID_HEADER).and_then(|v| v.to_str().ok()),
        Some(TRACE_ID)
    );
    assert_eq!(payload.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(
        payload.details(),
        Some(&json!({"deletedPoints": 50, "journeyId": 7}))
    );
}

#[rstest]
#[actix_web::test]
async fn upstream_failures_keep_the_provider_code(no_match: Error) {
    let (status, _, payload) = render(&no_match).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(payload.message(), "map matching failed: NoMatch");
    assert_eq!(
        payload.details(),
        Some(&json!({
            "upstreamCode": "NoMatch",
            "upstreamMessage": "Could not match the trace",
        }))
    );
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_the_trace_id() {
    let error = Error::internal("map matching request rejected locally: 150 coordinates")
        .with_details(json!({"coordinates": 150}))
        .with_trace_id(TRACE_ID);

    let (status, headers, payload) = render(&error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload.message(), REDACTED_MESSAGE);
    assert!(payload.details().is_none());
    assert_eq!(payload.trace_id(), Some(TRACE_ID));
    assert_eq!(
        headers.get(TRACE_ID_HEADER).and_then(|v| v.to_str().ok()),
        Some(TRACE_ID)
    );
}

#[rstest]
#[case(Error::not_found("journey 7 not found"))]
#[case(Error::service_unavailable("directory unavailable"))]
#[case(Error::internal("boom"))]
#[actix_web::test]
async fn error_responses_are_never_cached(#[case] error: Error) {
    let (_, headers, _) = render(&error).await;
    assert_eq!(
        headers.get(CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
}

#[rstest]
#[actix_web::test]
async fn missing_trace_id_omits_the_header() {
    let error = Error::invalid_request("serialNumber is required")
        .with_details(json!({"field": "serialNumber"}));

    let (_, headers, payload) = render(&error).await;

    assert!(headers.get(TRACE_ID_HEADER).is_none());
    assert_eq!(payload.trace_id(), None);
    assert_eq!(payload.details(), Some(&json!({"field": "serialNumber"})));
}

#[rstest]
fn non_internal_payloads_pass_through_unchanged(partial_delete: Error) {
    assert_eq!(client_payload(&partial_delete), partial_delete);
}

#[rstest]
fn actix_errors_become_redacted_internal_errors() {
    let err: Error = actix_web::error::ErrorBadRequest("malformed path").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), REDACTED_MESSAGE);
    assert_eq!(err.trace_id(), None);
    assert_eq!(err.details(), None);
}
