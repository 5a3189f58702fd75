//! Connection-scoped operations and queries over a [`TransitDatabase`].
//!
//! Every public method opens a [`Session`], performs one unit of work and
//! closes it again, including on error paths. Writes are committed before the
//! session closes.

use std::path::PathBuf;

use log::info;
use thiserror::Error;

use crate::store::{Session, StoreError, TransitDatabase};
use crate::{BusLine, Route, Stop};

/// Errors returned by [`BusLineService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The persistence layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A stop passed as an argument is not stored.
    #[error("stop {stop_id} is not in the database")]
    UnknownStop {
        /// Identifier of the missing stop.
        stop_id: u32,
    },
}

/// Query service over a single transit database.
///
/// # Examples
/// ```
/// use transit_core::{BusLine, BusLineService, Route, Stop, TransitDatabase};
///
/// # fn main() -> Result<(), transit_core::ServiceError> {
/// let dir = tempfile::tempdir().expect("temp dir");
/// let mut service = BusLineService::open(dir.path().join("transit.db"));
///
/// let stops = vec![
///     Stop::new(1, "Rotunda", 38.0356, -78.5034),
///     Stop::new(2, "Rice Hall", 38.0316, -78.5108),
/// ];
/// let line = BusLine::new(10, true, "Inner U-Loop", "IUL").with_route(Route::new(stops.clone()));
/// service.replace_all(&stops, &[line])?;
///
/// let closest = service.get_closest_stop(38.0350, -78.5040)?;
/// assert_eq!(closest.map(|stop| stop.id), Some(1));
///
/// let recommended = service.get_recommended_bus_line(&stops[0], &stops[1])?;
/// assert_eq!(recommended.map(|line| line.short_name), Some("IUL".to_owned()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BusLineService {
    database: TransitDatabase,
}

impl BusLineService {
    /// Wrap an existing, disconnected database.
    pub fn new(database: TransitDatabase) -> Self {
        Self { database }
    }

    /// Build a service for the SQLite database at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(TransitDatabase::new(path))
    }

    /// Borrow the underlying database.
    pub fn database(&self) -> &TransitDatabase {
        &self.database
    }

    /// Release the underlying database.
    pub fn into_inner(self) -> TransitDatabase {
        self.database
    }

    /// Create the transit tables if they are missing.
    pub fn initialise(&mut self) -> Result<(), ServiceError> {
        self.with_session(|session| {
            session.create_tables()?;
            session.commit()?;
            Ok(())
        })
    }

    /// Insert and commit stops.
    pub fn add_stops(&mut self, stops: &[Stop]) -> Result<(), ServiceError> {
        self.with_session(|session| {
            session.add_stops(stops)?;
            session.commit()?;
            Ok(())
        })
    }

    /// Insert and commit bus lines with their routes.
    pub fn add_bus_lines(&mut self, bus_lines: &[BusLine]) -> Result<(), ServiceError> {
        self.with_session(|session| {
            session.add_bus_lines(bus_lines)?;
            session.commit()?;
            Ok(())
        })
    }

    /// Replace the stored network with `stops` and `bus_lines`.
    ///
    /// Tables are created if needed, cleared, and reloaded in a single
    /// transaction. On failure the previously committed network is kept.
    pub fn replace_all(
        &mut self,
        stops: &[Stop],
        bus_lines: &[BusLine],
    ) -> Result<(), ServiceError> {
        self.with_session(|session| {
            session.create_tables()?;
            session.clear_tables()?;
            session.add_stops(stops)?;
            session.add_bus_lines(bus_lines)?;
            session.commit()?;
            Ok(())
        })?;
        info!(
            "loaded {} stops and {} bus lines into {}",
            stops.len(),
            bus_lines.len(),
            self.database.path().display()
        );
        Ok(())
    }

    /// All stored stops, ordered by id.
    pub fn get_stops(&mut self) -> Result<Vec<Stop>, ServiceError> {
        self.with_session(|session| Ok(session.get_all_stops()?))
    }

    /// The stop with the given id.
    pub fn get_stop(&mut self, stop_id: u32) -> Result<Option<Stop>, ServiceError> {
        self.with_session(|session| Ok(session.get_stop_by_id(stop_id)?))
    }

    /// Stops whose name contains `substring`, ignoring case.
    pub fn get_stops_by_name(&mut self, substring: &str) -> Result<Vec<Stop>, ServiceError> {
        self.with_session(|session| Ok(session.get_stops_by_name(substring)?))
    }

    /// All bus lines, scalar fields only.
    pub fn get_bus_lines(&mut self) -> Result<Vec<BusLine>, ServiceError> {
        self.with_session(|session| Ok(session.get_bus_lines()?))
    }

    /// All bus lines with their routes attached.
    ///
    /// Lines stored without route rows keep an empty route.
    pub fn get_bus_lines_with_routes(&mut self) -> Result<Vec<BusLine>, ServiceError> {
        self.with_session(|session| {
            session
                .get_bus_lines()?
                .into_iter()
                .map(|line| -> Result<BusLine, ServiceError> {
                    let route = route_or_empty(session, &line)?;
                    Ok(line.with_route(route))
                })
                .collect()
        })
    }

    /// The bus line with the given id, scalar fields only.
    pub fn get_bus_line_by_id(
        &mut self,
        bus_line_id: u32,
    ) -> Result<Option<BusLine>, ServiceError> {
        self.with_session(|session| Ok(session.get_bus_line_by_id(bus_line_id)?))
    }

    /// The bus line with the given short name (ignoring case), scalar fields only.
    pub fn get_bus_line_by_short_name(
        &mut self,
        short_name: &str,
    ) -> Result<Option<BusLine>, ServiceError> {
        self.with_session(|session| Ok(session.get_bus_line_by_short_name(short_name)?))
    }

    /// The ordered route of `bus_line`.
    ///
    /// Fails with [`StoreError::RouteNotFound`] when nothing is stored for it.
    pub fn get_route(&mut self, bus_line: &BusLine) -> Result<Route, ServiceError> {
        self.with_session(|session| Ok(session.get_route_for_bus_line(bus_line)?))
    }

    /// The stop nearest to a coordinate by planar distance.
    ///
    /// Stops are scanned in id order and a later stop only replaces the
    /// current best when it is strictly closer, so among equidistant stops the
    /// one with the lowest id wins. Returns `None` when no stops are stored.
    pub fn get_closest_stop(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Stop>, ServiceError> {
        let stops = self.get_stops()?;
        Ok(closest_stop(stops, latitude, longitude))
    }

    /// The shortest bus line whose route visits both `source` and
    /// `destination`.
    ///
    /// Only membership is checked; the order in which the two stops appear on
    /// the route is ignored. Candidates are compared by
    /// [`Route::total_distance`] and an exact tie keeps the line with the
    /// lower id. The returned line carries its route.
    ///
    /// Fails with [`ServiceError::UnknownStop`] when either stop is not
    /// stored, and returns `None` when no route visits both.
    pub fn get_recommended_bus_line(
        &mut self,
        source: &Stop,
        destination: &Stop,
    ) -> Result<Option<BusLine>, ServiceError> {
        self.with_session(|session| {
            for stop in [source, destination] {
                if session.get_stop_by_id(stop.id)?.is_none() {
                    return Err(ServiceError::UnknownStop { stop_id: stop.id });
                }
            }

            let mut best: Option<(BusLine, f64)> = None;
            for line in session.get_bus_lines()? {
                let route = route_or_empty(session, &line)?;
                if !(route.contains(source) && route.contains(destination)) {
                    continue;
                }
                let distance = route.total_distance();
                if best
                    .as_ref()
                    .is_none_or(|(_, shortest)| distance < *shortest)
                {
                    best = Some((line.with_route(route), distance));
                }
            }
            Ok(best.map(|(line, _)| line))
        })
    }

    fn with_session<T>(
        &mut self,
        work: impl FnOnce(&mut Session<'_>) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut session = self.database.session()?;
        let value = work(&mut session)?;
        session.close()?;
        Ok(value)
    }
}

fn route_or_empty(session: &Session<'_>, line: &BusLine) -> Result<Route, StoreError> {
    match session.get_route_for_bus_line(line) {
        Ok(route) => Ok(route),
        Err(StoreError::RouteNotFound { .. }) => Ok(Route::empty()),
        Err(err) => Err(err),
    }
}

fn closest_stop(
    stops: impl IntoIterator<Item = Stop>,
    latitude: f64,
    longitude: f64,
) -> Option<Stop> {
    let mut closest: Option<(Stop, f64)> = None;
    for stop in stops {
        let distance = stop.distance_to_coordinate(latitude, longitude);
        if closest
            .as_ref()
            .is_none_or(|(_, nearest)| distance < *nearest)
        {
            closest = Some((stop, distance));
        }
    }
    closest.map(|(stop, _)| stop)
}
