//! Sequential identity lookup for locating a journey's owner.
//!
//! Journey ids are start timestamps, so two provisionings of one device could
//! in principle share an id. Candidates are tried primary first, then the
//! remaining identities in resolver order, and the first hit wins. The lookup
//! is sequential and stops at the first match.

use tracing::debug;

use crate::domain::journey_engine::map_journey_repository_error;
use crate::domain::ports::JourneyRepository;
use crate::domain::{DeviceIdentities, Error, Journey, JourneyId};

/// Find the journey in the first identity partition that holds it.
pub(crate) async fn locate_journey(
    journeys: &dyn JourneyRepository,
    identities: &DeviceIdentities,
    journey_id: JourneyId,
) -> Result<Option<Journey>, Error> {
    for (attempt, identity) in identities.all().iter().enumerate() {
        let found = journeys
            .find(identity, journey_id)
            .await
            .map_err(map_journey_repository_error)?;
        if let Some(journey) = found {
            debug!(
                serial = %identities.serial_number(),
                identity = %identity,
                journey_id = %journey_id,
                attempts = attempt + 1,
                "journey located"
            );
            return Ok(Some(journey));
        }
    }
    debug!(
        serial = %identities.serial_number(),
        journey_id = %journey_id,
        attempts = identities.all().len(),
        "journey not found in any identity"
    );
    Ok(None)
}

/// Like [`locate_journey`] but maps absence to `not_found`.
pub(crate) async fn require_journey(
    journeys: &dyn JourneyRepository,
    identities: &DeviceIdentities,
    journey_id: JourneyId,
) -> Result<Journey, Error> {
    locate_journey(journeys, identities, journey_id)
        .await?
        .ok_or_else(|| {
            Error::not_found(format!(
                "journey {journey_id} not found for device {}",
                identities.serial_number()
            ))
        })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::{DateTime, Utc};
    use mockall::Sequence;
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{JourneyRepositoryError, MockJourneyRepository};
    use crate::domain::{ErrorCode, IdentityId, JourneyStatus, SerialNumber};

    fn id(raw: &str) -> IdentityId {
        IdentityId::new(raw).expect("valid identity")
    }

    fn journey(identity: &str, journey_id: i64) -> Journey {
        Journey {
            identity_id: id(identity),
            journey_id: JourneyId::new(journey_id),
            start_time: DateTime::<Utc>::from_timestamp(journey_id, 0).expect("timestamp"),
            end_time: None,
            status: JourneyStatus::Active,
            point_count: 3,
            total_distance: 120.0,
            matched_route: None,
        }
    }

    #[fixture]
    fn identities() -> DeviceIdentities {
        DeviceIdentities::new(
            SerialNumber::new("SN-100").expect("serial"),
            id("id-a"),
            vec![id("id-b"), id("id-c")],
        )
    }

    #[rstest]
    #[tokio::test]
    async fn lookup_stops_at_first_owner(identities: DeviceIdentities) {
        let mut repo = MockJourneyRepository::new();
        let mut seq = Sequence::new();
        repo.expect_find()
            .with(eq(id("id-a")), eq(JourneyId::new(42)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        repo.expect_find()
            .with(eq(id("id-b")), eq(JourneyId::new(42)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Some(journey("id-b", 42))));

        let found = locate_journey(&repo, &identities, JourneyId::new(42))
            .await
            .expect("lookup succeeds")
            .expect("journey found");

        assert_eq!(found.identity_id, id("id-b"));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_journey_maps_to_not_found(identities: DeviceIdentities) {
        let mut repo = MockJourneyRepository::new();
        repo.expect_find().times(3).returning(|_, _| Ok(None));

        let err = require_journey(&repo, &identities, JourneyId::new(7))
            .await
            .expect_err("not found");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn repository_failure_aborts_lookup(identities: DeviceIdentities) {
        let mut repo = MockJourneyRepository::new();
        repo.expect_find()
            .times(1)
            .returning(|_, _| Err(JourneyRepositoryError::connection("down")));

        let err = locate_journey(&repo, &identities, JourneyId::new(7))
            .await
            .expect_err("lookup fails");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
