//! Journeys backend: journey history, telemetry, map matching, and cascading
//! journey deletion for tracked devices.
//!
//! The crate follows a hexagonal layout. [`domain`] holds pure types,
//! services, and the ports they depend on; [`outbound`] implements those
//! ports against PostgreSQL and the Map Matching API; [`inbound`] exposes the
//! services over HTTP.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
