//! Map-matching request assembly.
//!
//! Each sampled point contributes one coordinate, timestamp, and search
//! radius. The radius scales the GPS dilution of precision to metres and is
//! clamped to the range the provider accepts.

use crate::domain::LocationPoint;
use crate::domain::ports::MapMatchingRequest;

/// Radius used when a point carries no dilution of precision.
pub const DEFAULT_MATCH_RADIUS_M: f64 = 25.0;
/// Smallest radius submitted.
pub const MIN_MATCH_RADIUS_M: f64 = 5.0;
/// Largest radius the provider accepts.
pub const MAX_MATCH_RADIUS_M: f64 = 50.0;
const DOP_TO_METRES: f64 = 10.0;

/// Search radius in metres for a point's dilution of precision.
///
/// # Examples
/// ```
/// use backend::domain::match_radius;
///
/// assert_eq!(match_radius(None), 25.0);
/// assert_eq!(match_radius(Some(0.2)), 5.0);
/// assert_eq!(match_radius(Some(1.5)), 15.0);
/// assert_eq!(match_radius(Some(9.0)), 50.0);
/// ```
pub fn match_radius(dop: Option<f64>) -> f64 {
    match dop {
        Some(dop) if dop.is_finite() => {
            (dop * DOP_TO_METRES).clamp(MIN_MATCH_RADIUS_M, MAX_MATCH_RADIUS_M)
        }
        _ => DEFAULT_MATCH_RADIUS_M,
    }
}

/// Build the provider request for an ordered, already sampled trail.
pub fn build_match_request(points: &[LocationPoint]) -> MapMatchingRequest {
    MapMatchingRequest {
        coordinates: points
            .iter()
            .map(|point| [point.longitude, point.latitude])
            .collect(),
        timestamps: points.iter().map(|point| point.timestamp.timestamp()).collect(),
        radiuses: points.iter().map(|point| match_radius(point.dop)).collect(),
    }
}
