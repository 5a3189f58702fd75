//! Behavioural tests for `BusLineService` queries using rstest-bdd.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;
use transit_core::{
    BusLine, BusLineService, ServiceError, Stop,
    test_support::{campus_lines, campus_stops, stop},
};

#[derive(Debug)]
struct QueryWorld {
    _temp_dir: TempDir,
    service: RefCell<BusLineService>,
    recommended: RefCell<Option<Result<Option<BusLine>, ServiceError>>>,
    closest: RefCell<Option<Stop>>,
}

impl QueryWorld {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let service = BusLineService::open(temp_dir.path().join("transit.db"));
        Self {
            _temp_dir: temp_dir,
            service: RefCell::new(service),
            recommended: RefCell::new(None),
            closest: RefCell::new(None),
        }
    }

    fn campus_stop(name: &str) -> Stop {
        campus_stops()
            .into_iter()
            .find(|stop| stop.name.contains(name))
            .expect("campus stop exists")
    }

    fn recommend(&self, source: &Stop, destination: &Stop) {
        let outcome = self
            .service
            .borrow_mut()
            .get_recommended_bus_line(source, destination);
        self.recommended.replace(Some(outcome));
    }

    fn expect_recommendation(&self) -> Option<BusLine> {
        match self.recommended.take() {
            Some(Ok(line)) => line,
            Some(Err(err)) => panic!("unexpected service error: {err}"),
            None => panic!("no recommendation was requested"),
        }
    }
}

#[fixture]
fn world() -> QueryWorld {
    QueryWorld::new()
}

#[given("a service loaded with the campus network")]
fn given_campus_service(world: &QueryWorld) {
    let stops = campus_stops();
    world
        .service
        .borrow_mut()
        .replace_all(&stops, &campus_lines(&stops))
        .expect("load campus network");
}

#[when("I ask for a line from Gilmer Hall to the Rotunda")]
fn when_gilmer_to_rotunda(world: &QueryWorld) {
    world.recommend(
        &QueryWorld::campus_stop("Gilmer"),
        &QueryWorld::campus_stop("Rotunda"),
    );
}

#[when("I ask for a line from Barracks Road to Rice Hall")]
fn when_barracks_to_rice(world: &QueryWorld) {
    world.recommend(
        &QueryWorld::campus_stop("Barracks"),
        &QueryWorld::campus_stop("Rice Hall"),
    );
}

#[when("I ask for a line from Gilmer Hall to an unknown stop")]
fn when_gilmer_to_unknown(world: &QueryWorld) {
    world.recommend(&QueryWorld::campus_stop("Gilmer"), &stop(1, 38.0, -78.5));
}

#[when("I ask for the stop closest to the Rotunda")]
fn when_closest_to_rotunda(world: &QueryWorld) {
    let closest = world
        .service
        .borrow_mut()
        .get_closest_stop(38.0357, -78.5035)
        .expect("query closest stop");
    world.closest.replace(closest);
}

#[then("the Inner U-Loop is recommended")]
fn then_inner_loop(world: &QueryWorld) {
    let line = world
        .expect_recommendation()
        .expect("a line should be recommended");
    assert_eq!(line.short_name, "IUL");
    assert_eq!(line.route.len(), 4);
}

#[then("no line is recommended")]
fn then_no_line(world: &QueryWorld) {
    assert!(world.expect_recommendation().is_none());
}

#[then("an unknown stop error is reported")]
fn then_unknown_stop(world: &QueryWorld) {
    let outcome = world.recommended.take();
    assert!(matches!(
        outcome,
        Some(Err(ServiceError::UnknownStop { stop_id: 1 }))
    ));
}

#[then("the Rotunda stop is returned")]
fn then_rotunda(world: &QueryWorld) {
    let closest = world.closest.borrow();
    let closest = closest.as_ref().expect("a stop should be found");
    assert_eq!(closest.name, "University Ave @ Rotunda");
}

#[scenario(path = "tests/features/transit_queries.feature", index = 0)]
fn shortest_line_recommended(world: QueryWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/transit_queries.feature", index = 1)]
fn no_shared_line(world: QueryWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/transit_queries.feature", index = 2)]
fn unknown_stop_rejected(world: QueryWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/transit_queries.feature", index = 3)]
fn closest_stop_found(world: QueryWorld) {
    let _ = world;
}
