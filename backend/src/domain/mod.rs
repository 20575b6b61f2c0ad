//! Domain primitives, engine components, and journey services.
//!
//! Purpose: resolve devices to their hardware identities, aggregate journey
//! and telemetry reads across those identities, and perform the journey
//! mutations (map matching, cascading delete). Types here are transport
//! agnostic; adapters live under `inbound` and `outbound`.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - JourneyQueryService / JourneyCommandService — driving port
//!   implementations used by the HTTP adapter.

mod aggregation;
mod device;
pub mod error;
mod journey;
mod journey_command_service;
mod journey_engine;
mod journey_locator;
mod journey_query_service;
mod map_matching;
pub mod ports;
mod power;
mod query_filter;
mod trace_id;
mod trajectory;

pub use self::aggregation::{FanOutResults, SortDirection, fan_out, merge_sorted};
pub use self::device::{Caller, DeviceIdentities, DeviceValidationError, IdentityId, SerialNumber};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::journey::{
    Journey, JourneyId, JourneyStatus, LocationKey, LocationPoint, LocationSource, MatchedRoute,
    PowerReading, RouteGeometry, UnknownLabelError,
};
pub use self::journey_command_service::JourneyCommandService;
pub use self::journey_engine::{JourneyEngineConfig, JourneyEnginePorts};
pub use self::journey_query_service::JourneyQueryService;
pub use self::map_matching::{
    DEFAULT_MATCH_RADIUS_M, MAX_MATCH_RADIUS_M, MIN_MATCH_RADIUS_M, build_match_request,
    match_radius,
};
pub use self::power::{PowerSummary, compute_power_delta};
pub use self::query_filter::{
    Dataset, PartitionQuery, PartitionQueryBuilder, PartitionQueryError, QueryFilter, ScanOrder,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::trajectory::sample_trajectory;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
