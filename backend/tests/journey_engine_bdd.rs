//! Behaviour tests for the journey engine over in-memory partitions.
//!
//! Devices are re-provisioned with fresh identities over time, so these
//! scenarios exercise fan-out reads, owner probing, batched cascading deletes,
//! and map matching against a serial number backed by two identities.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backend::domain::ports::{
    DeleteJourneyResponse, IdentityResolver, IdentityResolverError, JourneyDetail,
    JourneyRepository, JourneyRepositoryError, ListJourneysResponse, LocationRepository,
    LocationRepositoryError, MATCH_OK_CODE, MapMatchingRequest, MapMatchingResponse,
    MapMatchingSource, MapMatchingSourceError, MatchJourneyResponse, Matching, OwnershipLookup,
    OwnershipLookupError, PowerReadingRepository, PowerReadingRepositoryError,
};
use backend::domain::{
    DeviceIdentities, Error, IdentityId, Journey, JourneyCommandService, JourneyEngineConfig,
    JourneyEnginePorts, JourneyId, JourneyQueryService, JourneyStatus, LocationKey,
    LocationPoint, LocationSource, MatchedRoute, PartitionQuery, PowerReading, QueryFilter,
    RouteGeometry, ScanOrder, SerialNumber,
};
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use rstest::fixture;
use rstest_bdd_macros::scenario;

#[path = "journey_engine_bdd/steps.rs"]
mod steps;

const POINT_SPACING_SECS: i64 = 10;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn journey_start(journey_id: i64) -> DateTime<Utc> {
    now() - TimeDelta::days(1) + TimeDelta::minutes(journey_id)
}

fn identity(value: &str) -> IdentityId {
    IdentityId::new(value).expect("valid identity id")
}

fn serial(value: &str) -> SerialNumber {
    SerialNumber::new(value).expect("valid serial number")
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

fn passes_filters(
    query: &PartitionQuery,
    at: DateTime<Utc>,
    status: Option<JourneyStatus>,
    source: Option<LocationSource>,
) -> bool {
    query.filters().iter().all(|filter| match filter {
        QueryFilter::Status(wanted) => status.is_none_or(|status| status == *wanted),
        QueryFilter::Since(cutoff) => at >= *cutoff,
        QueryFilter::TimeRange(start, end) => at >= *start && at <= *end,
        QueryFilter::Source(wanted) => source.is_none_or(|source| source == *wanted),
    })
}

fn ordered_and_limited<T>(mut rows: Vec<T>, query: &PartitionQuery) -> Vec<T> {
    if query.order() == ScanOrder::Descending {
        rows.reverse();
    }
    if let Some(limit) = query.limit() {
        rows.truncate(limit);
    }
    rows
}

/// Serial-number directory and ownership records.
#[derive(Default)]
struct InMemoryDirectory {
    devices: Mutex<HashMap<SerialNumber, Vec<IdentityId>>>,
    owners: Mutex<HashSet<(IdentityId, String)>>,
}

impl InMemoryDirectory {
    fn register(&self, serial_number: SerialNumber, identities: Vec<IdentityId>) {
        self.devices
            .lock()
            .expect("directory lock")
            .insert(serial_number, identities);
    }

    fn grant(&self, identity: IdentityId, email: &str) {
        self.owners
            .lock()
            .expect("owner lock")
            .insert((identity, email.to_owned()));
    }
}

#[async_trait]
impl IdentityResolver for InMemoryDirectory {
    async fn resolve(
        &self,
        serial_number: &SerialNumber,
    ) -> Result<Option<DeviceIdentities>, IdentityResolverError> {
        let devices = self.devices.lock().expect("directory lock");
        Ok(devices.get(serial_number).and_then(|identities| {
            DeviceIdentities::from_ordered(serial_number.clone(), identities.clone()).ok()
        }))
    }
}

#[async_trait]
impl OwnershipLookup for InMemoryDirectory {
    async fn is_owner(
        &self,
        identity: &IdentityId,
        email: &str,
    ) -> Result<bool, OwnershipLookupError> {
        let owners = self.owners.lock().expect("owner lock");
        Ok(owners.contains(&(identity.clone(), email.to_owned())))
    }
}

/// Journey partitions keyed by identity then journey id.
#[derive(Default)]
struct InMemoryJourneys {
    records: Mutex<BTreeMap<(IdentityId, JourneyId), Journey>>,
}

impl InMemoryJourneys {
    fn insert(&self, journey: Journey) {
        self.records
            .lock()
            .expect("journey lock")
            .insert((journey.identity_id.clone(), journey.journey_id), journey);
    }

    fn get(&self, identity: &IdentityId, journey_id: JourneyId) -> Option<Journey> {
        self.records
            .lock()
            .expect("journey lock")
            .get(&(identity.clone(), journey_id))
            .cloned()
    }
}

#[async_trait]
impl JourneyRepository for InMemoryJourneys {
    async fn query(
        &self,
        identity: &IdentityId,
        query: &PartitionQuery,
    ) -> Result<Vec<Journey>, JourneyRepositoryError> {
        let records = self.records.lock().expect("journey lock");
        let rows = records
            .values()
            .filter(|journey| &journey.identity_id == identity)
            .filter(|journey| passes_filters(query, journey.start_time, Some(journey.status), None))
            .cloned()
            .collect();
        Ok(ordered_and_limited(rows, query))
    }

    async fn find(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<Option<Journey>, JourneyRepositoryError> {
        Ok(self.get(identity, journey_id))
    }

    async fn save_matched_route(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
        route: &MatchedRoute,
    ) -> Result<bool, JourneyRepositoryError> {
        let mut records = self.records.lock().expect("journey lock");
        Ok(match records.get_mut(&(identity.clone(), journey_id)) {
            Some(journey) => {
                journey.matched_route = Some(route.clone());
                true
            }
            None => false,
        })
    }

    async fn delete(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<bool, JourneyRepositoryError> {
        let mut records = self.records.lock().expect("journey lock");
        Ok(records.remove(&(identity.clone(), journey_id)).is_some())
    }
}

/// Location partitions plus a log of delete batch sizes.
#[derive(Default)]
struct InMemoryLocations {
    points: Mutex<BTreeMap<(IdentityId, DateTime<Utc>), LocationPoint>>,
    batches: Mutex<Vec<usize>>,
}

impl InMemoryLocations {
    fn insert(&self, point: LocationPoint) {
        self.points
            .lock()
            .expect("location lock")
            .insert((point.identity_id.clone(), point.timestamp), point);
    }

    fn batches(&self) -> Vec<usize> {
        self.batches.lock().expect("batch lock").clone()
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocations {
    async fn query(
        &self,
        identity: &IdentityId,
        query: &PartitionQuery,
    ) -> Result<Vec<LocationPoint>, LocationRepositoryError> {
        let points = self.points.lock().expect("location lock");
        let rows = points
            .values()
            .filter(|point| &point.identity_id == identity)
            .filter(|point| passes_filters(query, point.timestamp, None, Some(point.source)))
            .cloned()
            .collect();
        Ok(ordered_and_limited(rows, query))
    }

    async fn list_for_journey(
        &self,
        identity: &IdentityId,
        journey_id: JourneyId,
    ) -> Result<Vec<LocationPoint>, LocationRepositoryError> {
        let points = self.points.lock().expect("location lock");
        // The journey index makes no ordering promise; hand points back newest first.
        Ok(points
            .values()
            .rev()
            .filter(|point| &point.identity_id == identity)
            .filter(|point| point.journey_id == Some(journey_id))
            .cloned()
            .collect())
    }

    async fn delete_batch(&self, keys: &[LocationKey]) -> Result<usize, LocationRepositoryError> {
        let mut points = self.points.lock().expect("location lock");
        let removed = keys
            .iter()
            .filter(|key| {
                points
                    .remove(&(key.identity_id.clone(), key.timestamp))
                    .is_some()
            })
            .count();
        self.batches.lock().expect("batch lock").push(keys.len());
        Ok(removed)
    }
}

/// Power-monitor partitions.
#[derive(Default)]
struct InMemoryPowerReadings {
    readings: Mutex<Vec<PowerReading>>,
}

#[async_trait]
impl PowerReadingRepository for InMemoryPowerReadings {
    async fn query(
        &self,
        identity: &IdentityId,
        query: &PartitionQuery,
    ) -> Result<Vec<PowerReading>, PowerReadingRepositoryError> {
        let readings = self.readings.lock().expect("power lock");
        let mut rows: Vec<PowerReading> = readings
            .iter()
            .filter(|reading| &reading.identity_id == identity)
            .filter(|reading| passes_filters(query, reading.timestamp, None, None))
            .cloned()
            .collect();
        rows.sort_by_key(|reading| reading.timestamp);
        Ok(ordered_and_limited(rows, query))
    }
}

/// Map matcher that replays one scripted response and counts calls.
struct ScriptedMatcher {
    response: Mutex<MapMatchingResponse>,
    calls: AtomicUsize,
}

impl Default for ScriptedMatcher {
    fn default() -> Self {
        Self {
            response: Mutex::new(MapMatchingResponse {
                code: "NoMatch".to_owned(),
                matchings: Vec::new(),
                message: Some("no script configured".to_owned()),
            }),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedMatcher {
    fn script(&self, response: MapMatchingResponse) {
        *self.response.lock().expect("matcher lock") = response;
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MapMatchingSource for ScriptedMatcher {
    async fn match_trajectory(
        &self,
        _request: &MapMatchingRequest,
    ) -> Result<MapMatchingResponse, MapMatchingSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.lock().expect("matcher lock").clone())
    }
}

/// Result of the most recent `When` step.
enum Outcome {
    Listed(ListJourneysResponse),
    Detail(Box<JourneyDetail>),
    Deleted(DeleteJourneyResponse),
    Matched(MatchJourneyResponse),
    Failed(Error),
}

struct JourneyEngineWorld {
    runtime: tokio::runtime::Runtime,
    directory: Arc<InMemoryDirectory>,
    journeys: Arc<InMemoryJourneys>,
    locations: Arc<InMemoryLocations>,
    power: Arc<InMemoryPowerReadings>,
    matcher: Arc<ScriptedMatcher>,
    outcome: RefCell<Option<Outcome>>,
}

impl JourneyEngineWorld {
    fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        Self {
            runtime,
            directory: Arc::new(InMemoryDirectory::default()),
            journeys: Arc::new(InMemoryJourneys::default()),
            locations: Arc::new(InMemoryLocations::default()),
            power: Arc::new(InMemoryPowerReadings::default()),
            matcher: Arc::new(ScriptedMatcher::default()),
            outcome: RefCell::new(None),
        }
    }

    fn ports(&self) -> JourneyEnginePorts {
        JourneyEnginePorts {
            identities: self.directory.clone(),
            ownership: self.directory.clone(),
            journeys: self.journeys.clone(),
            locations: self.locations.clone(),
            power_readings: self.power.clone(),
            map_matching: self.matcher.clone(),
        }
    }

    fn query_service(&self) -> JourneyQueryService {
        JourneyQueryService::new(
            self.ports(),
            JourneyEngineConfig::default(),
            Arc::new(FixedClock(now())),
        )
    }

    fn command_service(&self) -> JourneyCommandService {
        JourneyCommandService::new(
            self.ports(),
            JourneyEngineConfig::default(),
            Arc::new(FixedClock(now())),
        )
    }

    fn seed_journey(&self, owner: &str, journey_id: i64, status: JourneyStatus, points: u32) {
        let owner = identity(owner);
        let start = journey_start(journey_id);
        let end = start + TimeDelta::seconds(i64::from(points) * POINT_SPACING_SECS);
        self.journeys.insert(Journey {
            identity_id: owner.clone(),
            journey_id: JourneyId::new(journey_id),
            start_time: start,
            end_time: (status == JourneyStatus::Completed).then_some(end),
            status,
            point_count: points,
            total_distance: f64::from(points) * 12.5,
            matched_route: None,
        });
        for index in 0..points {
            let offset = i64::from(index);
            self.locations.insert(LocationPoint {
                identity_id: owner.clone(),
                timestamp: start + TimeDelta::seconds(offset * POINT_SPACING_SECS),
                journey_id: Some(JourneyId::new(journey_id)),
                latitude: 55.95 + f64::from(index) * 0.0001,
                longitude: -3.19 + f64::from(index) * 0.0001,
                velocity: Some(4.2),
                bearing: Some(45.0),
                distance: Some(12.5),
                dop: Some(1.1),
                jcount: Some(index),
                source: LocationSource::Gps,
            });
        }
    }

    fn seed_power(&self, owner: &str, journey_id: i64, counters: &[f64]) {
        let owner = identity(owner);
        let start = journey_start(journey_id);
        let mut readings = self.power.readings.lock().expect("power lock");
        for (offset, counter) in (0_i64..).zip(counters) {
            readings.push(PowerReading {
                identity_id: owner.clone(),
                timestamp: start + TimeDelta::seconds(offset),
                milliamp_hours: Some(*counter),
                voltage: Some(12.1),
                temperature: Some(21.0),
            });
        }
    }

    fn record<T>(&self, result: Result<T, Error>, wrap: impl FnOnce(T) -> Outcome) {
        let outcome = match result {
            Ok(value) => wrap(value),
            Err(error) => Outcome::Failed(error),
        };
        *self.outcome.borrow_mut() = Some(outcome);
    }

    fn with_outcome<R>(&self, f: impl FnOnce(&Outcome) -> R) -> R {
        let outcome = self.outcome.borrow();
        f(outcome.as_ref().expect("a When step should have run"))
    }

    fn route_with_confidence(confidence: f64) -> MapMatchingResponse {
        MapMatchingResponse {
            code: MATCH_OK_CODE.to_owned(),
            matchings: vec![Matching {
                geometry: RouteGeometry::line_string(vec![[-3.19, 55.95], [-3.1896, 55.9504]]),
                confidence,
            }],
            message: None,
        }
    }
}

#[fixture]
fn world() -> JourneyEngineWorld {
    JourneyEngineWorld::new()
}

#[scenario(path = "tests/features/journey_engine.feature")]
fn journey_engine_scenarios(world: JourneyEngineWorld) {
    drop(world);
}
