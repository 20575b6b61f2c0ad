//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (storage partitions, identity resolution, ownership, map
//! matching) are implemented by outbound adapters. Driving ports
//! ([`JourneyQuery`], [`JourneyCommand`]) are implemented by domain services
//! and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_resolver;
mod journey_command;
mod journey_query;
mod journey_repository;
mod location_repository;
mod map_matching_source;
mod ownership_lookup;
mod power_reading_repository;

#[cfg(test)]
pub use identity_resolver::MockIdentityResolver;
pub use identity_resolver::{FixtureIdentityResolver, IdentityResolver, IdentityResolverError};
#[cfg(test)]
pub use journey_command::MockJourneyCommand;
pub use journey_command::{
    DeleteJourneyRequest, DeleteJourneyResponse, FixtureJourneyCommand, JourneyCommand,
    MatchJourneyRequest, MatchJourneyResponse,
};
#[cfg(test)]
pub use journey_query::MockJourneyQuery;
pub use journey_query::{
    FixtureJourneyQuery, GetJourneyRequest, JourneyDetail, JourneyQuery, ListJourneysRequest,
    ListJourneysResponse, ListLocationsRequest, ListPowerReadingsRequest, LocationHistory,
    PowerHistory,
};
#[cfg(test)]
pub use journey_repository::MockJourneyRepository;
pub use journey_repository::{FixtureJourneyRepository, JourneyRepository, JourneyRepositoryError};
#[cfg(test)]
pub use location_repository::MockLocationRepository;
pub use location_repository::{
    FixtureLocationRepository, LocationRepository, LocationRepositoryError, MAX_DELETE_BATCH,
};
#[cfg(test)]
pub use map_matching_source::MockMapMatchingSource;
pub use map_matching_source::{
    FixtureMapMatchingSource, MATCH_OK_CODE, MAX_MATCH_COORDINATES, MIN_MATCH_COORDINATES,
    MapMatchingRequest, MapMatchingResponse,
    MapMatchingSource, MapMatchingSourceError, Matching,
};
#[cfg(test)]
pub use ownership_lookup::MockOwnershipLookup;
pub use ownership_lookup::{FixtureOwnershipLookup, OwnershipLookup, OwnershipLookupError};
#[cfg(test)]
pub use power_reading_repository::MockPowerReadingRepository;
pub use power_reading_repository::{
    FixturePowerReadingRepository, PowerReadingRepository, PowerReadingRepositoryError,
};
