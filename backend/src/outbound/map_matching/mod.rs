//! Map-matching outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `MapMatchingSource` port against a Mapbox-compatible Map Matching API.

mod dto;
mod http_source;

pub use http_source::{MapboxMatchingConfig, MapboxMatchingSource};
