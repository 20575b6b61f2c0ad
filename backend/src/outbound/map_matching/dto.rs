//! DTOs for decoding Map Matching API responses.
//!
//! Bodies are decoded into these transport DTOs first, then mapped into the
//! domain response in one pass. Unsuccessful result codes still decode; the
//! domain decides what a non-`Ok` code means.

use serde::Deserialize;

use crate::domain::RouteGeometry;
use crate::domain::ports::{MapMatchingResponse, Matching};

#[derive(Debug, Deserialize)]
pub(super) struct MatchResponseDto {
    pub(super) code: String,
    #[serde(default)]
    pub(super) matchings: Vec<MatchingDto>,
    #[serde(default)]
    pub(super) message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MatchingDto {
    pub(super) geometry: GeometryDto,
    #[serde(default)]
    pub(super) confidence: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct GeometryDto {
    #[serde(rename = "type")]
    pub(super) geometry_type: String,
    #[serde(default)]
    pub(super) coordinates: Vec<[f64; 2]>,
}

impl MatchResponseDto {
    pub(super) fn into_domain(self) -> Result<MapMatchingResponse, String> {
        let matchings = self
            .matchings
            .into_iter()
            .enumerate()
            .map(|(index, matching)| matching.into_domain(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MapMatchingResponse {
            code: self.code,
            matchings,
            message: self.message,
        })
    }
}

impl MatchingDto {
    fn into_domain(self, index: usize) -> Result<Matching, String> {
        if self.geometry.geometry_type != RouteGeometry::LINE_STRING {
            return Err(format!(
                "matching {index} has unsupported geometry type {}",
                self.geometry.geometry_type
            ));
        }
        if self
            .geometry
            .coordinates
            .iter()
            .flatten()
            .any(|value| !value.is_finite())
        {
            return Err(format!("matching {index} includes non-finite coordinates"));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "matching {index} confidence {} outside [0, 1]",
                self.confidence
            ));
        }
        Ok(Matching {
            geometry: RouteGeometry::line_string(self.geometry.coordinates),
            confidence: self.confidence,
        })
    }
}
