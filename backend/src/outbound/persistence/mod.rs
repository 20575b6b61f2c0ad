//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! The storage engine behind the journey ports is PostgreSQL accessed via
//! `diesel-async` and `bb8` pooling. Each telemetry table is keyed by
//! `identity_id` first, so every port operation reads or writes exactly one
//! identity partition.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. No business logic resides here.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: pool and Diesel failures map to each port's
//!   `Connection`/`Query` variants.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselJourneyRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/journeys")).await?;
//! let journeys = DieselJourneyRepository::new(pool);
//! ```

mod diesel_device_directory;
mod diesel_error_mapping;
mod diesel_journey_repository;
mod diesel_location_repository;
mod diesel_power_reading_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_device_directory::DieselDeviceDirectory;
pub use diesel_journey_repository::DieselJourneyRepository;
pub use diesel_location_repository::DieselLocationRepository;
pub use diesel_power_reading_repository::DieselPowerReadingRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Convert a domain row limit to SQL `LIMIT`, saturating on overflow.
fn query_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
