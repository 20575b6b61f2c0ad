//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed identity partitions and the device
//!   directory, using Diesel ORM
//! - **map_matching**: reqwest client for the Map Matching API
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod map_matching;
pub mod persistence;
