//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use actix_web::error::{PathError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use serde_json::json;

use crate::domain::{Error, JourneyId, JourneyStatus, LocationSource, SerialNumber};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidSerialNumber,
    InvalidJourneyId,
    InvalidStatus,
    InvalidSource,
    InvalidQuery,
    InvalidPath,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidSerialNumber => "invalid_serial_number",
            ErrorCode::InvalidJourneyId => "invalid_journey_id",
            ErrorCode::InvalidStatus => "invalid_status",
            ErrorCode::InvalidSource => "invalid_source",
            ErrorCode::InvalidQuery => "invalid_query",
            ErrorCode::InvalidPath => "invalid_path",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn invalid_value(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_serial_number(value: String, field: FieldName) -> Result<SerialNumber, Error> {
    SerialNumber::new(value.as_str()).map_err(|_| {
        invalid_value(
            field,
            format!("{} must not be empty", field.as_str()),
            ErrorCode::InvalidSerialNumber,
            &value,
        )
    })
}

pub(crate) fn parse_journey_id(value: &str, field: FieldName) -> Result<JourneyId, Error> {
    JourneyId::from_str(value).map_err(|_| {
        invalid_value(
            field,
            format!("{} must be an integer journey id", field.as_str()),
            ErrorCode::InvalidJourneyId,
            value,
        )
    })
}

pub(crate) fn parse_optional_status(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<JourneyStatus>, Error> {
    value
        .map(|raw| {
            JourneyStatus::from_str(&raw).map_err(|_| {
                invalid_value(
                    field,
                    format!("{} must be active or completed", field.as_str()),
                    ErrorCode::InvalidStatus,
                    &raw,
                )
            })
        })
        .transpose()
}

pub(crate) fn parse_optional_source(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<LocationSource>, Error> {
    value
        .map(|raw| {
            LocationSource::from_str(&raw).map_err(|_| {
                invalid_value(
                    field,
                    format!(
                        "{} must be one of gps, cell, triangulation, wifi",
                        field.as_str()
                    ),
                    ErrorCode::InvalidSource,
                    &raw,
                )
            })
        })
        .transpose()
}

fn query_error_handler(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {error}"))
        .with_details(json!({ "code": ErrorCode::InvalidQuery.as_str() }))
        .into()
}

fn path_error_handler(error: PathError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid path: {error}"))
        .with_details(json!({ "code": ErrorCode::InvalidPath.as_str() }))
        .into()
}

/// Extractor configuration reporting malformed query strings in the API error
/// envelope instead of actix's plain-text default.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error_handler)
}

/// Extractor configuration reporting malformed path segments in the API error
/// envelope.
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(path_error_handler)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::Value;

    use super::*;
    use crate::domain::ErrorCode as DomainErrorCode;

    fn detail<'a>(error: &'a Error, key: &str) -> Option<&'a str> {
        error.details().and_then(|d| d.get(key)).and_then(Value::as_str)
    }

    #[rstest]
    fn serial_number_is_trimmed() {
        let serial = parse_serial_number(" SN-100 ".to_owned(), FieldName::new("serialNumber"))
            .expect("valid serial");
        assert_eq!(serial.as_ref(), "SN-100");
    }

    #[rstest]
    fn blank_serial_number_is_rejected() {
        let error = parse_serial_number("  ".to_owned(), FieldName::new("serialNumber"))
            .expect_err("blank serial");
        assert_eq!(error.code(), DomainErrorCode::InvalidRequest);
        assert_eq!(detail(&error, "code"), Some("invalid_serial_number"));
    }

    #[rstest]
    #[case("1767225600000", Some(1_767_225_600_000))]
    #[case("abc", None)]
    #[case("1.5", None)]
    fn journey_ids_must_be_integers(#[case] raw: &str, #[case] expected: Option<i64>) {
        let parsed = parse_journey_id(raw, FieldName::new("journeyId"));
        match expected {
            Some(value) => assert_eq!(parsed.expect("valid id"), JourneyId::new(value)),
            None => {
                let error = parsed.expect_err("invalid id");
                assert_eq!(detail(&error, "field"), Some("journeyId"));
                assert_eq!(detail(&error, "value"), Some(raw));
                assert_eq!(detail(&error, "code"), Some("invalid_journey_id"));
            }
        }
    }

    #[rstest]
    fn status_and_source_are_optional() {
        assert_eq!(
            parse_optional_status(None, FieldName::new("status")).expect("absent"),
            None
        );
        assert_eq!(
            parse_optional_source(Some("wifi".to_owned()), FieldName::new("source"))
                .expect("valid source"),
            Some(LocationSource::Wifi)
        );
    }

    #[rstest]
    fn unknown_labels_are_rejected() {
        let status = parse_optional_status(Some("paused".to_owned()), FieldName::new("status"))
            .expect_err("unknown status");
        assert_eq!(detail(&status, "code"), Some("invalid_status"));

        let source = parse_optional_source(Some("radar".to_owned()), FieldName::new("source"))
            .expect_err("unknown source");
        assert_eq!(detail(&source, "code"), Some("invalid_source"));
    }
}
