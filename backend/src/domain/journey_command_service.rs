//! Write-side journey service: map matching and cascading delete.
//!
//! Map matching samples the journey's trail down to the provider budget,
//! submits it, and caches the returned geometry on the journey record. The
//! cached route is only written on success.
//!
//! Deletion removes location points in bounded batches, one commit per batch
//! and in order, then removes the journey record. A batch failure leaves the
//! earlier batches deleted and the journey intact; the error reports how many
//! points were removed so callers can retry. Re-deleting missing points is a
//! no-op, so a retry completes the delete.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::journey_engine::{
    map_journey_repository_error, map_location_repository_error, map_ownership_error,
    resolve_device,
};
use crate::domain::journey_locator::require_journey;
use crate::domain::ports::{
    DeleteJourneyRequest, DeleteJourneyResponse, JourneyCommand, MapMatchingSourceError,
    MatchJourneyRequest, MatchJourneyResponse,
};
use crate::domain::{
    Caller, DeviceIdentities, Error, IdentityId, JourneyEngineConfig, JourneyEnginePorts,
    JourneyId, LocationKey, LocationPoint, MatchedRoute, build_match_request, sample_trajectory,
};

/// Minimum points needed to describe a route.
const MIN_MATCH_POINTS: usize = 2;

fn map_matching_source_error(error: MapMatchingSourceError) -> Error {
    match error {
        MapMatchingSourceError::NotConfigured => Error::service_unavailable(error.to_string()),
        MapMatchingSourceError::InvalidRequest { .. } => {
            Error::internal(format!("map matching request rejected locally: {error}"))
        }
        _ => Error::map_matching_failed(error.kind(), error.to_string()),
    }
}

/// Journey service implementing the write driving port.
#[derive(Clone)]
pub struct JourneyCommandService {
    ports: JourneyEnginePorts,
    config: JourneyEngineConfig,
    clock: Arc<dyn Clock>,
}

impl JourneyCommandService {
    /// Create a command service over the given ports.
    pub fn new(ports: JourneyEnginePorts, config: JourneyEngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            ports,
            config,
            clock,
        }
    }

    async fn ordered_points(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<Vec<LocationPoint>, Error> {
        let mut points = self
            .ports
            .locations
            .list_for_journey(identity, journey_id)
            .await
            .map_err(map_location_repository_error)?;
        points.sort_by_key(|point| point.timestamp);
        Ok(points)
    }

    async fn authorize_delete(
        &self,
        caller: &Caller,
        identities: &DeviceIdentities,
    ) -> Result<(), Error> {
        if caller.is_admin() {
            return Ok(());
        }
        let owns = self
            .ports
            .ownership
            .is_owner(identities.primary(), caller.email())
            .await
            .map_err(map_ownership_error)?;
        if owns {
            Ok(())
        } else {
            warn!(
                serial = %identities.serial_number(),
                caller = caller.email(),
                "delete rejected for non-owner"
            );
            Err(Error::forbidden(format!(
                "not permitted to modify device {}",
                identities.serial_number()
            )))
        }
    }

    async fn delete_points_in_batches(
        &self,
        journey_id: JourneyId,
        keys: &[LocationKey],
    ) -> Result<usize, Error> {
        let batch_size = self.config.effective_delete_batch_size();
        let mut deleted = 0;
        for (batch, chunk) in keys.chunks(batch_size).enumerate() {
            match self.ports.locations.delete_batch(chunk).await {
                Ok(removed) => {
                    deleted += removed;
                    debug!(
                        journey_id = %journey_id,
                        batch,
                        size = chunk.len(),
                        deleted,
                        "location batch deleted"
                    );
                }
                Err(source) => {
                    warn!(
                        journey_id = %journey_id,
                        batch,
                        deleted,
                        kind = source.kind(),
                        error = %source,
                        "location batch delete failed; journey left partially deleted"
                    );
                    return Err(map_location_repository_error(source).with_details(json!({
                        "deletedPoints": deleted,
                        "journeyId": journey_id,
                    })));
                }
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl JourneyCommand for JourneyCommandService {
    async fn match_journey(
        &self,
        request: MatchJourneyRequest,
    ) -> Result<MatchJourneyResponse, Error> {
        let identities =
            resolve_device(self.ports.identities.as_ref(), &request.serial_number).await?;
        let journey =
            require_journey(self.ports.journeys.as_ref(), &identities, request.journey_id).await?;
        let owner = journey.identity_id.clone();

        let points = self.ordered_points(&owner, journey.journey_id).await?;
        if points.len() < MIN_MATCH_POINTS {
            return Err(Error::invalid_request(format!(
                "too few points to match journey {}: {} (need at least {MIN_MATCH_POINTS})",
                journey.journey_id,
                points.len()
            )));
        }
        let sampled = sample_trajectory(&points, self.config.effective_match_points());
        let match_request = build_match_request(&sampled);

        let response = self
            .ports
            .map_matching
            .match_trajectory(&match_request)
            .await
            .map_err(map_matching_source_error)?;
        let best = response.best_match().ok_or_else(|| {
            let message = response
                .message
                .clone()
                .unwrap_or_else(|| "no matchings returned".to_owned());
            warn!(
                journey_id = %journey.journey_id,
                code = %response.code,
                "map matching returned no usable match"
            );
            Error::map_matching_failed(response.code.clone(), message)
        })?;

        let route = MatchedRoute {
            geometry: best.geometry.clone(),
            confidence: best.confidence,
            matched_at: self.clock.utc(),
        };
        let stored = self
            .ports
            .journeys
            .save_matched_route(&owner, journey.journey_id, &route)
            .await
            .map_err(map_journey_repository_error)?;
        if !stored {
            return Err(Error::not_found(format!(
                "journey {} was removed during matching",
                journey.journey_id
            )));
        }

        info!(
            serial = %request.serial_number,
            identity = %owner,
            journey_id = %journey.journey_id,
            original = points.len(),
            sampled = sampled.len(),
            confidence = route.confidence,
            "journey map matched"
        );
        Ok(MatchJourneyResponse {
            journey_id: journey.journey_id,
            matched_route: route.geometry,
            confidence: route.confidence,
            original_points: points.len(),
            sampled_points: sampled.len(),
        })
    }

    async fn delete_journey(
        &self,
        request: DeleteJourneyRequest,
    ) -> Result<DeleteJourneyResponse, Error> {
        let caller = request
            .caller
            .as_ref()
            .ok_or_else(|| Error::unauthorized("authentication required"))?;
        let identities =
            resolve_device(self.ports.identities.as_ref(), &request.serial_number).await?;
        self.authorize_delete(caller, &identities).await?;
        let journey =
            require_journey(self.ports.journeys.as_ref(), &identities, request.journey_id).await?;
        let owner = journey.identity_id.clone();

        let keys: Vec<LocationKey> = self
            .ordered_points(&owner, journey.journey_id)
            .await?
            .iter()
            .map(LocationPoint::key)
            .collect();
        let deleted_points = self
            .delete_points_in_batches(journey.journey_id, &keys)
            .await?;

        let removed = self
            .ports
            .journeys
            .delete(&owner, journey.journey_id)
            .await
            .map_err(|source| {
                map_journey_repository_error(source).with_details(json!({
                    "deletedPoints": deleted_points,
                    "journeyId": journey.journey_id,
                }))
            })?;
        if !removed {
            warn!(
                identity = %owner,
                journey_id = %journey.journey_id,
                "journey record already absent after point deletion"
            );
        }

        info!(
            serial = %request.serial_number,
            identity = %owner,
            journey_id = %journey.journey_id,
            deleted = deleted_points,
            "journey deleted"
        );
        Ok(DeleteJourneyResponse {
            journey_id: journey.journey_id,
            deleted_points,
        })
    }
}

#[cfg(test)]
#[path = "journey_command_service_tests.rs"]
mod tests;
