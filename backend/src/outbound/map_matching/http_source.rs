//! Reqwest-backed map-matching adapter for the Mapbox Map Matching API.
//!
//! This adapter owns transport details only: URL construction, timeout and
//! HTTP error mapping, and JSON decoding into the domain response. The access
//! token is injected at construction and never logged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::dto::MatchResponseDto;
use crate::domain::ports::{
    MAX_MATCH_COORDINATES, MIN_MATCH_COORDINATES, MapMatchingRequest, MapMatchingResponse,
    MapMatchingSource, MapMatchingSourceError,
};

const USER_AGENT: &str = "journeys-backend-map-matching/0.1";

/// Connection settings for the Map Matching API.
#[derive(Debug, Clone)]
pub struct MapboxMatchingConfig {
    /// API origin, for example `https://api.mapbox.com`.
    pub base_url: Url,
    /// Routing profile (`driving`, `walking`, `cycling`, `driving-traffic`).
    pub profile: String,
    /// Access token; matching is disabled when absent.
    pub access_token: Option<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// Map-matching source that issues one GET per trajectory.
pub struct MapboxMatchingSource {
    client: Client,
    base_url: Url,
    profile: String,
    access_token: Option<String>,
}

impl MapboxMatchingSource {
    /// Build an adapter using a reqwest client with an explicit timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: MapboxMatchingConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            profile: config.profile,
            access_token: config
                .access_token
                .filter(|token| !token.trim().is_empty()),
        })
    }
}

#[async_trait]
impl MapMatchingSource for MapboxMatchingSource {
    async fn match_trajectory(
        &self,
        request: &MapMatchingRequest,
    ) -> Result<MapMatchingResponse, MapMatchingSourceError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(MapMatchingSourceError::not_configured)?;
        let url = build_match_url(&self.base_url, &self.profile, token, request)?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            coordinates = request.coordinates.len(),
            "map matching response received"
        );
        decode_response(status, body.as_ref())
    }
}

/// Decode a response body, keeping provider result codes on error statuses.
///
/// The API reports unmatched traces with a 4xx status and a JSON body carrying
/// `code`/`message`; those are returned as responses so the domain surfaces
/// the provider's code. Rate limiting and bodies without a code map to
/// transport-level errors.
fn decode_response(
    status: StatusCode,
    body: &[u8],
) -> Result<MapMatchingResponse, MapMatchingSourceError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(map_status_error(status, body));
    }
    match serde_json::from_slice::<MatchResponseDto>(body) {
        Ok(decoded) if status.is_success() || status.is_client_error() => decoded
            .into_domain()
            .map_err(MapMatchingSourceError::decode),
        Ok(_) => Err(map_status_error(status, body)),
        Err(error) if status.is_success() => Err(MapMatchingSourceError::decode(format!(
            "invalid map matching JSON payload: {error}"
        ))),
        Err(_) => Err(map_status_error(status, body)),
    }
}

fn build_match_url(
    base_url: &Url,
    profile: &str,
    token: &str,
    request: &MapMatchingRequest,
) -> Result<Url, MapMatchingSourceError> {
    validate_request(request)?;

    let coordinates = request
        .coordinates
        .iter()
        .map(|[lon, lat]| format!("{lon:.6},{lat:.6}"))
        .collect::<Vec<_>>()
        .join(";");
    let timestamps = request
        .timestamps
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(";");
    let radiuses = request
        .radiuses
        .iter()
        .map(|radius| format!("{radius:.1}"))
        .collect::<Vec<_>>()
        .join(";");

    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| MapMatchingSourceError::invalid_request("base URL cannot carry a path"))?
        .pop_if_empty()
        .extend(["matching", "v5", "mapbox", profile, coordinates.as_str()]);
    url.query_pairs_mut()
        .append_pair("access_token", token)
        .append_pair("geometries", "geojson")
        .append_pair("overview", "full")
        .append_pair("steps", "false")
        .append_pair("timestamps", &timestamps)
        .append_pair("radiuses", &radiuses);
    Ok(url)
}

fn validate_request(request: &MapMatchingRequest) -> Result<(), MapMatchingSourceError> {
    let count = request.coordinates.len();
    if count < MIN_MATCH_COORDINATES {
        return Err(MapMatchingSourceError::invalid_request(
            "at least two coordinates are required",
        ));
    }
    if count > MAX_MATCH_COORDINATES {
        return Err(MapMatchingSourceError::invalid_request(format!(
            "{count} coordinates exceed the limit of {MAX_MATCH_COORDINATES}"
        )));
    }
    if request.timestamps.len() != count || request.radiuses.len() != count {
        return Err(MapMatchingSourceError::invalid_request(
            "timestamps and radiuses must align with coordinates",
        ));
    }
    let out_of_range = request.coordinates.iter().any(|[lon, lat]| {
        !(-180.0..=180.0).contains(lon) || !(-90.0..=90.0).contains(lat)
    });
    if out_of_range {
        return Err(MapMatchingSourceError::invalid_request(
            "coordinates must be WGS84 longitude/latitude pairs",
        ));
    }
    Ok(())
}

fn map_transport_error(error: reqwest::Error) -> MapMatchingSourceError {
    // Strip the URL: it carries the access token.
    let error = error.without_url();
    if error.is_timeout() {
        MapMatchingSourceError::timeout(error.to_string())
    } else {
        MapMatchingSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MapMatchingSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => MapMatchingSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            MapMatchingSourceError::timeout(message)
        }
        _ if status.is_client_error() => MapMatchingSourceError::invalid_request(message),
        _ => MapMatchingSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let mut preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        preview.push_str("...");
    }
    preview
}
