//! Step definitions for journey engine scenarios.

use super::*;
use backend::domain::Caller;
use backend::domain::ports::{
    DeleteJourneyRequest, GetJourneyRequest, JourneyCommand, JourneyQuery, ListJourneysRequest,
    MatchJourneyRequest,
};
use rstest_bdd_macros::{given, then, when};

fn parse_list<T: std::str::FromStr>(raw: &str) -> Vec<T>
where
    T::Err: std::fmt::Debug,
{
    raw.split(',')
        .map(|value| value.trim().parse().expect("list entry should parse"))
        .collect()
}

fn delete_as(
    world: &JourneyEngineWorld,
    caller: Option<Caller>,
    journey_id: i64,
    serial_number: &str,
) {
    let service = world.command_service();
    let result = world.runtime.block_on(service.delete_journey(DeleteJourneyRequest {
        serial_number: serial(serial_number),
        journey_id: JourneyId::new(journey_id),
        caller,
    }));
    world.record(result, Outcome::Deleted);
}

#[given("device {serial_number} resolves to identities {primary} and {previous}")]
fn device_resolves_to_identities(
    world: &JourneyEngineWorld,
    serial_number: String,
    primary: String,
    previous: String,
) {
    world.directory.register(
        serial(&serial_number),
        vec![identity(&primary), identity(&previous)],
    );
}

#[given("identity {owner} has an active journey {journey_id} with {points} points")]
fn identity_has_active_journey(
    world: &JourneyEngineWorld,
    owner: String,
    journey_id: i64,
    points: u32,
) {
    world.seed_journey(&owner, journey_id, JourneyStatus::Active, points);
}

#[given("identity {owner} has a completed journey {journey_id} with {points} points")]
fn identity_has_completed_journey(
    world: &JourneyEngineWorld,
    owner: String,
    journey_id: i64,
    points: u32,
) {
    world.seed_journey(&owner, journey_id, JourneyStatus::Completed, points);
}

#[given("identity {owner} reported power counters {counters} during journey {journey_id}")]
fn identity_reported_power_counters(
    world: &JourneyEngineWorld,
    owner: String,
    counters: String,
    journey_id: i64,
) {
    world.seed_power(&owner, journey_id, &parse_list::<f64>(&counters));
}

#[given("the caller {email} owns identity {owner}")]
fn the_caller_owns_identity(world: &JourneyEngineWorld, email: String, owner: String) {
    world.directory.grant(identity(&owner), &email);
}

#[given("the map matcher returns a route with confidence {confidence}")]
fn the_map_matcher_returns_a_route(world: &JourneyEngineWorld, confidence: f64) {
    world
        .matcher
        .script(JourneyEngineWorld::route_with_confidence(confidence));
}

#[given("the map matcher returns no matchings")]
fn the_map_matcher_returns_no_matchings(world: &JourneyEngineWorld) {
    world.matcher.script(MapMatchingResponse {
        code: MATCH_OK_CODE.to_owned(),
        matchings: Vec::new(),
        message: None,
    });
}

#[when("journeys for {serial_number} are listed with status {status} and limit {limit}")]
fn journeys_are_listed(
    world: &JourneyEngineWorld,
    serial_number: String,
    status: String,
    limit: usize,
) {
    let service = world.query_service();
    let result = world.runtime.block_on(service.list_journeys(ListJourneysRequest {
        serial_number: serial(&serial_number),
        status: Some(status.parse().expect("known journey status")),
        limit: Some(limit),
    }));
    world.record(result, Outcome::Listed);
}

#[when("journey {journey_id} of {serial_number} is fetched")]
fn journey_is_fetched(world: &JourneyEngineWorld, journey_id: i64, serial_number: String) {
    let service = world.query_service();
    let result = world.runtime.block_on(service.get_journey(GetJourneyRequest {
        serial_number: serial(&serial_number),
        journey_id: JourneyId::new(journey_id),
    }));
    world.record(result, |detail| Outcome::Detail(Box::new(detail)));
}

#[when("an administrator deletes journey {journey_id} of {serial_number}")]
fn an_administrator_deletes_journey(
    world: &JourneyEngineWorld,
    journey_id: i64,
    serial_number: String,
) {
    let admin = Caller::new("ops@example.com", true);
    delete_as(world, Some(admin), journey_id, &serial_number);
}

#[when("an anonymous caller deletes journey {journey_id} of {serial_number}")]
fn an_anonymous_caller_deletes_journey(
    world: &JourneyEngineWorld,
    journey_id: i64,
    serial_number: String,
) {
    delete_as(world, None, journey_id, &serial_number);
}

#[when("the caller {email} deletes journey {journey_id} of {serial_number}")]
fn the_caller_deletes_journey(
    world: &JourneyEngineWorld,
    email: String,
    journey_id: i64,
    serial_number: String,
) {
    delete_as(world, Some(Caller::new(email, false)), journey_id, &serial_number);
}

#[when("journey {journey_id} of {serial_number} is map matched")]
fn journey_is_map_matched(world: &JourneyEngineWorld, journey_id: i64, serial_number: String) {
    let service = world.command_service();
    let result = world.runtime.block_on(service.match_journey(MatchJourneyRequest {
        serial_number: serial(&serial_number),
        journey_id: JourneyId::new(journey_id),
    }));
    world.record(result, Outcome::Matched);
}

#[then("the listed journey ids are {ids}")]
fn the_listed_journey_ids_are(world: &JourneyEngineWorld, ids: String) {
    let expected = parse_list::<i64>(&ids);
    world.with_outcome(|outcome| match outcome {
        Outcome::Listed(response) => {
            let listed: Vec<i64> = response
                .journeys
                .iter()
                .map(|journey| journey.journey_id.value())
                .collect();
            assert_eq!(listed, expected);
            assert_eq!(response.count(), expected.len());
        }
        _ => panic!("expected a journey list"),
    });
}

fn with_detail(world: &JourneyEngineWorld, f: impl FnOnce(&JourneyDetail)) {
    world.with_outcome(|outcome| match outcome {
        Outcome::Detail(detail) => f(detail),
        Outcome::Failed(error) => panic!("expected journey detail, got {error:?}"),
        _ => panic!("expected journey detail"),
    });
}

#[then("the journey belongs to identity {owner}")]
fn the_journey_belongs_to_identity(world: &JourneyEngineWorld, owner: String) {
    with_detail(world, |detail| {
        assert_eq!(detail.journey.identity_id, identity(&owner));
        assert!(
            detail
                .points
                .iter()
                .all(|point| point.identity_id == identity(&owner))
        );
    });
}

#[then("the journey points are in ascending time order")]
fn the_journey_points_are_ascending(world: &JourneyEngineWorld) {
    with_detail(world, |detail| {
        assert!(!detail.points.is_empty());
        assert!(
            detail
                .points
                .windows(2)
                .all(|pair| pair[0].timestamp < pair[1].timestamp)
        );
    });
}

#[then("the journey consumed {consumed} milliamp hours")]
fn the_journey_consumed(world: &JourneyEngineWorld, consumed: f64) {
    with_detail(world, |detail| {
        let power = detail.power.as_ref().expect("power summary");
        assert!((power.consumed_mah - consumed).abs() < f64::EPSILON);
    });
}

#[then("the journey has no power summary")]
fn the_journey_has_no_power_summary(world: &JourneyEngineWorld) {
    with_detail(world, |detail| assert!(detail.power.is_none()));
}

#[then("the journey detail includes the cached route")]
fn the_journey_detail_includes_the_cached_route(world: &JourneyEngineWorld) {
    with_detail(world, |detail| {
        let route = detail.journey.matched_route.as_ref().expect("cached route");
        assert_eq!(route.geometry.geometry_type, RouteGeometry::LINE_STRING);
        assert_eq!(route.matched_at, now());
    });
}

#[then("the request fails with {code}")]
fn the_request_fails_with(world: &JourneyEngineWorld, code: String) {
    world.with_outcome(|outcome| match outcome {
        Outcome::Failed(error) => {
            let actual = serde_json::to_value(error.code()).expect("serialise error code");
            assert_eq!(actual, serde_json::Value::String(code));
        }
        _ => panic!("expected the request to fail with {code}"),
    });
}

#[then("{count} points are reported deleted")]
fn points_are_reported_deleted(world: &JourneyEngineWorld, count: usize) {
    world.with_outcome(|outcome| match outcome {
        Outcome::Deleted(response) => assert_eq!(response.deleted_points, count),
        Outcome::Failed(error) => panic!("expected delete to succeed, got {error:?}"),
        _ => panic!("expected a delete response"),
    });
}

#[then("location deletes ran in batches of {sizes}")]
fn location_deletes_ran_in_batches(world: &JourneyEngineWorld, sizes: String) {
    assert_eq!(world.locations.batches(), parse_list::<usize>(&sizes));
}

#[then("journey {journey_id} no longer exists for identity {owner}")]
fn journey_no_longer_exists(world: &JourneyEngineWorld, journey_id: i64, owner: String) {
    let owner = identity(&owner);
    assert!(world.journeys.get(&owner, JourneyId::new(journey_id)).is_none());
    let remaining = world
        .runtime
        .block_on(
            world
                .locations
                .list_for_journey(&owner, JourneyId::new(journey_id)),
        )
        .expect("list remaining points");
    assert!(remaining.is_empty());
}

#[then("journey {journey_id} still exists for identity {owner}")]
fn journey_still_exists(world: &JourneyEngineWorld, journey_id: i64, owner: String) {
    assert!(
        world
            .journeys
            .get(&identity(&owner), JourneyId::new(journey_id))
            .is_some()
    );
}

#[then("the match reports {points} original points")]
fn the_match_reports_original_points(world: &JourneyEngineWorld, points: usize) {
    world.with_outcome(|outcome| match outcome {
        Outcome::Matched(response) => {
            assert_eq!(response.original_points, points);
            assert!(response.sampled_points <= points);
        }
        Outcome::Failed(error) => panic!("expected match to succeed, got {error:?}"),
        _ => panic!("expected a match response"),
    });
}

#[then("journey {journey_id} of identity {owner} caches a route with confidence {confidence}")]
fn journey_caches_route(
    world: &JourneyEngineWorld,
    journey_id: i64,
    owner: String,
    confidence: f64,
) {
    let journey = world
        .journeys
        .get(&identity(&owner), JourneyId::new(journey_id))
        .expect("journey stored");
    let route = journey.matched_route.expect("cached route");
    assert!((route.confidence - confidence).abs() < f64::EPSILON);
}

#[then("journey {journey_id} of identity {owner} has no cached route")]
fn journey_has_no_cached_route(world: &JourneyEngineWorld, journey_id: i64, owner: String) {
    let journey = world
        .journeys
        .get(&identity(&owner), JourneyId::new(journey_id))
        .expect("journey stored");
    assert!(journey.matched_route.is_none());
}

#[then("the map matcher was called {calls} times")]
fn the_map_matcher_was_called(world: &JourneyEngineWorld, calls: usize) {
    assert_eq!(world.matcher.calls(), calls);
}
