//! Unit tests for the SQLite transit store.

use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use rusqlite::Connection;
use tempfile::TempDir;

use super::{StoreError, TransitDatabase};
use crate::test_support::{campus_lines, campus_stops, line, stop};
use crate::{BusLine, Stop};

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

fn database_path(dir: &TempDir) -> PathBuf {
    dir.path().join("transit.db")
}

/// A connected database with the schema created and committed.
fn connected(path: &Path) -> TransitDatabase {
    let mut database = TransitDatabase::new(path);
    database.connect().expect("connect");
    database.create_tables().expect("create tables");
    database.commit().expect("commit schema");
    database
}

/// A connected database holding the committed campus network.
fn seeded(path: &Path) -> TransitDatabase {
    let mut database = connected(path);
    let stops = campus_stops();
    database.add_stops(&stops).expect("add stops");
    database
        .add_bus_lines(&campus_lines(&stops))
        .expect("add bus lines");
    database.commit().expect("commit network");
    database
}

fn count(path: &Path, sql: &str) -> i64 {
    let connection = Connection::open(path).expect("open inspection connection");
    connection
        .query_row(sql, [], |row| row.get(0))
        .expect("count rows")
}

#[rstest]
fn connecting_twice_is_rejected(temp_dir: TempDir) {
    let path = database_path(&temp_dir);
    let mut database = TransitDatabase::new(&path);
    database.connect().expect("first connect");

    let err = database.connect().expect_err("second connect should fail");
    assert!(matches!(err, StoreError::AlreadyConnected { path: reported } if reported == path));
    assert!(database.is_connected(), "original connection stays open");
}

#[rstest]
fn operations_require_a_connection(temp_dir: TempDir) {
    let mut database = TransitDatabase::new(database_path(&temp_dir));

    assert!(matches!(
        database.get_all_stops(),
        Err(StoreError::NotConnected)
    ));
    assert!(matches!(database.commit(), Err(StoreError::NotConnected)));
    assert!(matches!(database.rollback(), Err(StoreError::NotConnected)));
    assert!(matches!(
        database.add_stops(&[stop(1, 0.0, 0.0)]),
        Err(StoreError::NotConnected)
    ));
    assert!(matches!(
        database.disconnect(),
        Err(StoreError::NotConnected)
    ));
}

#[rstest]
fn operations_fail_after_disconnect(temp_dir: TempDir) {
    let mut database = connected(&database_path(&temp_dir));
    database.disconnect().expect("disconnect");

    assert!(!database.is_connected());
    assert!(matches!(
        database.get_bus_lines(),
        Err(StoreError::NotConnected)
    ));
}

#[rstest]
fn creating_tables_twice_is_harmless(temp_dir: TempDir) {
    let path = database_path(&temp_dir);
    let mut database = connected(&path);
    database.create_tables().expect("second create");
    database.commit().expect("commit");
    database.disconnect().expect("disconnect");

    let tables = count(
        &path,
        "SELECT COUNT(*) FROM sqlite_master
            WHERE type = 'table' AND name IN ('Stops', 'BusLines', 'Routes')",
    );
    assert_eq!(tables, 3, "expected exactly three transit tables");
}

#[rstest]
fn route_round_trips_in_order(temp_dir: TempDir) {
    let mut database = connected(&database_path(&temp_dir));
    let stops = vec![stop(30, 0.0, 3.0), stop(10, 0.0, 1.0), stop(20, 0.0, 2.0)];
    database.add_stops(&stops).expect("add stops");
    let zigzag = vec![
        stops[1].clone(),
        stops[0].clone(),
        stops[2].clone(),
        stops[1].clone(),
    ];
    let bus_line = line(7, "Z", &zigzag);
    database
        .add_bus_lines(std::slice::from_ref(&bus_line))
        .expect("add bus line");
    database.commit().expect("commit");

    let route = database
        .get_route_for_bus_line(&bus_line)
        .expect("route stored");
    let ids: Vec<_> = route.stops.iter().map(|stop| stop.id).collect();
    assert_eq!(ids, vec![10, 30, 20, 10]);
    assert_eq!(route.stops[1].name, "Stop 30");
}

#[rstest]
fn route_is_not_found_for_unknown_line(temp_dir: TempDir) {
    let database = seeded(&database_path(&temp_dir));
    let ghost = BusLine::new(9999, true, "Ghost", "G");

    let err = database
        .get_route_for_bus_line(&ghost)
        .expect_err("unknown line has no route");
    assert!(matches!(
        err,
        StoreError::RouteNotFound { bus_line_id: 9999 }
    ));
}

#[rstest]
fn route_is_not_found_for_line_without_stops(temp_dir: TempDir) {
    let mut database = connected(&database_path(&temp_dir));
    let bare = BusLine::new(5, true, "Depot Shuttle", "DS");
    database
        .add_bus_lines(std::slice::from_ref(&bare))
        .expect("line without route");

    assert_eq!(
        database.get_bus_line_by_id(5).expect("lookup"),
        Some(bare.clone())
    );
    assert!(matches!(
        database.get_route_for_bus_line(&bare),
        Err(StoreError::RouteNotFound { bus_line_id: 5 })
    ));
}

#[rstest]
fn duplicate_stop_rolls_back_the_pending_batch(temp_dir: TempDir) {
    let mut database = connected(&database_path(&temp_dir));
    database
        .add_stops(&[stop(1, 0.0, 0.0)])
        .expect("first batch");

    let err = database
        .add_stops(&[stop(2, 1.0, 1.0), stop(1, 0.0, 0.0)])
        .expect_err("duplicate id should fail");

    assert!(err.is_constraint_violation(), "unexpected error: {err}");
    assert!(
        database.get_all_stops().expect("read stops").is_empty(),
        "nothing since the last commit should survive"
    );
}

#[rstest]
fn duplicate_stop_keeps_committed_rows(temp_dir: TempDir) {
    let path = database_path(&temp_dir);
    let mut database = connected(&path);
    database
        .add_stops(&[stop(1, 0.0, 0.0)])
        .expect("first batch");
    database.commit().expect("commit");

    database
        .add_stops(&[stop(2, 1.0, 1.0), stop(1, 0.0, 0.0)])
        .expect_err("duplicate id should fail");
    database.disconnect().expect("disconnect");

    assert_eq!(count(&path, "SELECT COUNT(*) FROM Stops"), 1);
}

#[rstest]
fn dangling_stop_reference_leaves_lines_unchanged(temp_dir: TempDir) {
    let path = database_path(&temp_dir);
    let mut database = seeded(&path);
    let known = stop(4235106, 38.0340, -78.5134);
    let unknown = stop(99, 0.0, 0.0);

    let err = database
        .add_bus_lines(&[line(8, "X", &[known, unknown])])
        .expect_err("foreign key should reject unknown stop");

    match err {
        StoreError::Constraint { operation, .. } => assert_eq!(operation, "insert route entry"),
        other => panic!("expected constraint violation, got {other:?}"),
    }
    assert_eq!(database.get_bus_lines().expect("read lines").len(), 2);
    database.disconnect().expect("disconnect");
    assert_eq!(count(&path, "SELECT COUNT(*) FROM BusLines"), 2);
    assert_eq!(count(&path, "SELECT COUNT(*) FROM Routes"), 7);
}

#[rstest]
fn deleting_a_stop_cascades_to_routes(temp_dir: TempDir) {
    let path = database_path(&temp_dir);
    let mut database = seeded(&path);

    assert!(database.delete_stop(4235106).expect("delete stop"));
    database.commit().expect("commit");
    database.disconnect().expect("disconnect");

    assert_eq!(
        count(&path, "SELECT COUNT(*) FROM Routes WHERE StopID = 4235106"),
        0
    );
    assert_eq!(count(&path, "SELECT COUNT(*) FROM Routes"), 5);
}

#[rstest]
fn deleting_a_bus_line_cascades_to_routes(temp_dir: TempDir) {
    let mut database = seeded(&database_path(&temp_dir));

    assert!(database.delete_bus_line(4013).expect("delete line"));
    assert!(!database.delete_bus_line(4013).expect("second delete"));

    let remaining = database.get_bus_lines().expect("read lines");
    assert_eq!(remaining.len(), 1);
    let gilmer = stop(4235108, 0.0, 0.0);
    assert!(
        database
            .get_bus_lines_by_stop(&gilmer)
            .expect("lines by stop")
            .is_empty()
    );
}

#[rstest]
fn clear_tables_removes_every_row(temp_dir: TempDir) {
    let path = database_path(&temp_dir);
    let mut database = seeded(&path);

    database.clear_tables().expect("clear");
    database.commit().expect("commit");
    database.disconnect().expect("disconnect");

    for table in ["Stops", "BusLines", "Routes"] {
        assert_eq!(
            count(&path, &format!("SELECT COUNT(*) FROM {table}")),
            0,
            "{table} should be empty"
        );
    }
}

#[rstest]
fn uncommitted_writes_are_discarded_on_disconnect(temp_dir: TempDir) {
    let path = database_path(&temp_dir);
    let mut database = connected(&path);
    database.add_stops(&campus_stops()).expect("add stops");
    database.disconnect().expect("disconnect");

    database.connect().expect("reconnect");
    assert!(database.get_all_stops().expect("read stops").is_empty());
}

#[rstest]
fn bus_lines_are_loaded_without_routes(temp_dir: TempDir) {
    let database = seeded(&database_path(&temp_dir));

    let lines = database.get_bus_lines().expect("read lines");
    let ids: Vec<_> = lines.iter().map(|line| line.id).collect();
    assert_eq!(ids, vec![4013, 4015]);
    assert!(lines.iter().all(|line| line.route.is_empty()));
    assert!(!lines[1].is_active);
}

#[rstest]
fn stop_lookups(temp_dir: TempDir) {
    let database = seeded(&database_path(&temp_dir));

    let rice = database
        .get_stop_by_id(4235108)
        .expect("lookup")
        .expect("stop stored");
    assert_eq!(rice.name, "Whitehead Rd @ Rice Hall");
    assert_eq!(rice.latitude, 38.0316);
    assert_eq!(rice.longitude, -78.5108);
    assert!(database.get_stop_by_id(1).expect("lookup").is_none());

    let matches = database.get_stops_by_name("rice").expect("search");
    assert_eq!(matches, vec![rice]);
    let roads = database.get_stops_by_name("RD @").expect("search");
    assert_eq!(roads.len(), 3);
}

#[rstest]
#[case("Inner U-Loop", Some(4013))]
#[case("inner u-loop", Some(4013))]
#[case("Inner", None)]
fn long_name_lookup_ignores_case(
    temp_dir: TempDir,
    #[case] name: &str,
    #[case] expected: Option<u32>,
) {
    let database = seeded(&database_path(&temp_dir));
    let found = database.get_bus_line_by_long_name(name).expect("lookup");
    assert_eq!(found.map(|line| line.id), expected);
}

#[rstest]
#[case("NL", Some(4015))]
#[case("nl", Some(4015))]
#[case("N", None)]
fn short_name_lookup_ignores_case(
    temp_dir: TempDir,
    #[case] name: &str,
    #[case] expected: Option<u32>,
) {
    let database = seeded(&database_path(&temp_dir));
    let found = database.get_bus_line_by_short_name(name).expect("lookup");
    assert_eq!(found.map(|line| line.id), expected);
}

#[rstest]
fn lines_by_stop_are_distinct(temp_dir: TempDir) {
    let mut database = connected(&database_path(&temp_dir));
    let a = stop(1, 0.0, 0.0);
    let b = stop(2, 0.0, 1.0);
    database
        .add_stops(&[a.clone(), b.clone()])
        .expect("add stops");
    database
        .add_bus_lines(&[
            line(10, "LOOP", &[a.clone(), b.clone(), a.clone()]),
            line(11, "OUT", std::slice::from_ref(&b)),
        ])
        .expect("add lines");

    let through_a = database.get_bus_lines_by_stop(&a).expect("lines by stop");
    assert_eq!(
        through_a.iter().map(|line| line.id).collect::<Vec<_>>(),
        vec![10]
    );
    let through_b = database.get_bus_lines_by_stop(&b).expect("lines by stop");
    assert_eq!(through_b.len(), 2);
}

#[rstest]
fn session_disconnects_when_dropped(temp_dir: TempDir) {
    let mut database = TransitDatabase::new(database_path(&temp_dir));
    {
        let mut session = database.session().expect("open session");
        session.create_tables().expect("create tables");
        session.commit().expect("commit");
    }
    assert!(!database.is_connected());
    database.connect().expect("connection was released");
}

#[rstest]
fn session_releases_connection_on_error_path(temp_dir: TempDir) {
    fn load_twice(database: &mut TransitDatabase, stops: &[Stop]) -> Result<(), StoreError> {
        let mut session = database.session()?;
        session.create_tables()?;
        session.add_stops(stops)?;
        session.add_stops(stops)?;
        session.commit()?;
        session.close()
    }

    let mut database = TransitDatabase::new(database_path(&temp_dir));
    let err = load_twice(&mut database, &campus_stops()).expect_err("duplicates fail");

    assert!(err.is_constraint_violation());
    assert!(!database.is_connected(), "session should have disconnected");
    let session = database.session().expect("reconnect");
    session.close().expect("close");
}
