//! HTTP inbound adapter exposing REST endpoints.

pub mod caller;
pub mod error;
pub mod health;
pub mod journeys;
pub mod journeys_dto;
pub mod schemas;
pub mod state;
pub mod telemetry;
pub mod validation;

pub use error::ApiResult;
