//! Builders wiring outbound adapters into the journey services.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use backend::domain::ports::{
    FixtureIdentityResolver, FixtureJourneyRepository, FixtureLocationRepository,
    FixtureMapMatchingSource, FixtureOwnershipLookup, FixturePowerReadingRepository,
    MapMatchingSource,
};
use backend::domain::{JourneyCommandService, JourneyEnginePorts, JourneyQueryService};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::persistence::{
    DbPool, DieselDeviceDirectory, DieselJourneyRepository, DieselLocationRepository,
    DieselPowerReadingRepository,
};

use super::ServerConfig;

fn database_ports(pool: &DbPool, map_matching: Arc<dyn MapMatchingSource>) -> JourneyEnginePorts {
    let directory = Arc::new(DieselDeviceDirectory::new(pool.clone()));
    JourneyEnginePorts {
        identities: directory.clone(),
        ownership: directory,
        journeys: Arc::new(DieselJourneyRepository::new(pool.clone())),
        locations: Arc::new(DieselLocationRepository::new(pool.clone())),
        power_readings: Arc::new(DieselPowerReadingRepository::new(pool.clone())),
        map_matching,
    }
}

fn fixture_ports(map_matching: Arc<dyn MapMatchingSource>) -> JourneyEnginePorts {
    JourneyEnginePorts {
        identities: Arc::new(FixtureIdentityResolver),
        ownership: Arc::new(FixtureOwnershipLookup),
        journeys: Arc::new(FixtureJourneyRepository),
        locations: Arc::new(FixtureLocationRepository),
        power_readings: Arc::new(FixturePowerReadingRepository),
        map_matching,
    }
}

/// Build the engine port bundle, using database adapters when a pool is
/// configured and fixtures otherwise.
pub(super) fn build_engine_ports(config: &mut ServerConfig) -> JourneyEnginePorts {
    let map_matching: Arc<dyn MapMatchingSource> = match config.map_matching.take() {
        Some(source) => Arc::new(source),
        None => Arc::new(FixtureMapMatchingSource),
    };
    match &config.db_pool {
        Some(pool) => database_ports(pool, map_matching),
        None => fixture_ports(map_matching),
    }
}

/// Build the HTTP state from the engine ports.
pub(super) fn build_http_state(config: &mut ServerConfig) -> web::Data<HttpState> {
    let ports = build_engine_ports(config);
    let clock = Arc::new(DefaultClock);
    let query = JourneyQueryService::new(ports.clone(), config.engine, clock.clone());
    let command = JourneyCommandService::new(ports, config.engine, clock);
    web::Data::new(HttpState::new(HttpStatePorts {
        journeys_query: Arc::new(query),
        journeys_command: Arc::new(command),
    }))
}
