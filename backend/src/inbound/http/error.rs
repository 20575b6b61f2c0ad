//! Domain error to HTTP response mapping.
//!
//! Status codes follow the error taxonomy of the journey engine: map-matching
//! failures surface as `502 Bad Gateway`, unavailable partitions (including
//! a partially completed delete) as `503`, and internal errors are redacted
//! to a generic message. Every error response echoes the request trace id and
//! is marked `no-store`.

use actix_web::http::header;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for journey and telemetry handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::UpstreamFailure => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing payload: internal errors lose their message and details but
/// keep the trace id so operators can correlate the log line.
fn client_payload(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

fn log_failure(error: &Error) {
    let trace_id = error.trace_id().unwrap_or("-");
    match error.code() {
        ErrorCode::InternalError => error!(
            trace_id,
            message = error.message(),
            details = ?error.details(),
            "internal error redacted from response"
        ),
        ErrorCode::UpstreamFailure | ErrorCode::ServiceUnavailable => warn!(
            trace_id,
            code = ?error.code(),
            message = error.message(),
            details = ?error.details(),
            "dependency failure returned to client"
        ),
        _ => {}
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        log_failure(self);
        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header((header::CACHE_CONTROL, "no-store"));
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(client_payload(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}

#[cfg(test)]
mod tests;
