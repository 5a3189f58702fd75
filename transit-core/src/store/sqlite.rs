//! SQLite-backed persistence for stops, bus lines and their routes.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};

use crate::{BusLine, Route, Stop};

use super::{StoreError, schema};

const SELECT_STOPS: &str = "SELECT ID, Name, Latitude, Longitude FROM Stops";
const SELECT_BUS_LINES: &str = "SELECT ID, IsActive, LongName, ShortName FROM BusLines";

/// Persistence engine owning at most one SQLite connection.
///
/// A freshly constructed database is disconnected. [`TransitDatabase::connect`]
/// opens the connection with foreign keys enforced and begins a transaction;
/// writes stay pending until [`TransitDatabase::commit`]. Failed writes roll
/// back everything since the last commit or rollback before returning the
/// error.
///
/// Prefer [`TransitDatabase::session`], which releases the connection on every
/// exit path.
///
/// # Examples
/// ```
/// use transit_core::{Stop, TransitDatabase};
///
/// # fn main() -> Result<(), transit_core::StoreError> {
/// let mut database = TransitDatabase::new(":memory:");
/// let mut session = database.session()?;
/// session.create_tables()?;
/// session.add_stops(&[Stop::new(1, "Rotunda", 38.0356, -78.5034)])?;
/// session.commit()?;
///
/// let found = session.get_stops_by_name("rotunda")?;
/// assert_eq!(found.len(), 1);
/// # Ok(())
/// # }
/// ```
pub struct TransitDatabase {
    path: PathBuf,
    connection: Option<Connection>,
}

impl fmt::Debug for TransitDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitDatabase")
            .field("path", &self.path)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl TransitDatabase {
    /// Describe a database stored at `path`. Nothing is opened yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            connection: None,
        }
    }

    /// Location of the SQLite database.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Open the connection, enable foreign keys and begin a transaction.
    pub fn connect(&mut self) -> Result<(), StoreError> {
        if self.connection.is_some() {
            return Err(StoreError::AlreadyConnected {
                path: self.path.clone(),
            });
        }

        let connection = Connection::open(&self.path).map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })?;
        // The pragma is ignored inside a transaction, so set it first.
        connection
            .pragma_update(None, "foreign_keys", true)
            .map_err(|source| StoreError::ForeignKeys { source })?;
        begin(&connection)?;

        debug!("connected to transit database at {}", self.path.display());
        self.connection = Some(connection);
        Ok(())
    }

    /// Discard uncommitted work and close the connection.
    pub fn disconnect(&mut self) -> Result<(), StoreError> {
        let connection = self.connection.take().ok_or(StoreError::NotConnected)?;
        if !connection.is_autocommit() {
            connection
                .execute_batch("ROLLBACK")
                .map_err(StoreError::sqlite("roll back on disconnect"))?;
        }
        connection
            .close()
            .map_err(|(_, source)| StoreError::Close {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            "disconnected from transit database at {}",
            self.path.display()
        );
        Ok(())
    }

    /// Commit all changes since connecting or since the last commit/rollback.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        let connection = self.connection()?;
        connection
            .execute_batch("COMMIT")
            .map_err(StoreError::sqlite("commit transaction"))?;
        begin(connection)
    }

    /// Discard all changes since connecting or since the last commit/rollback.
    pub fn rollback(&mut self) -> Result<(), StoreError> {
        let connection = self.connection()?;
        // Some failures (disk full, I/O errors) already ended the transaction.
        if !connection.is_autocommit() {
            connection
                .execute_batch("ROLLBACK")
                .map_err(StoreError::sqlite("roll back transaction"))?;
        }
        begin(connection)
    }

    /// Create the `Stops`, `BusLines` and `Routes` tables if absent.
    pub fn create_tables(&mut self) -> Result<(), StoreError> {
        schema::create_tables(self.connection()?)?;
        debug!("transit schema present in {}", self.path.display());
        Ok(())
    }

    /// Insert stops. Rolls back the pending transaction on failure.
    pub fn add_stops(&mut self, stops: &[Stop]) -> Result<(), StoreError> {
        let outcome = insert_stops(self.connection()?, stops);
        self.rollback_on_error(outcome, "add stops")
    }

    /// Insert bus lines and one `Routes` row per stop on each line's route.
    ///
    /// Every stop referenced by a route must already be stored. Rolls back
    /// the pending transaction on failure.
    pub fn add_bus_lines(&mut self, bus_lines: &[BusLine]) -> Result<(), StoreError> {
        let outcome = insert_bus_lines(self.connection()?, bus_lines);
        self.rollback_on_error(outcome, "add bus lines")
    }

    /// Delete every row, children first: `Routes`, `BusLines`, then `Stops`.
    pub fn clear_tables(&mut self) -> Result<(), StoreError> {
        let outcome = delete_all(self.connection()?);
        self.rollback_on_error(outcome, "clear tables")
    }

    /// Delete a stop and, through the cascade, its route entries.
    ///
    /// Returns whether a stop was removed.
    pub fn delete_stop(&mut self, stop_id: u32) -> Result<bool, StoreError> {
        let outcome = self
            .connection()?
            .execute("DELETE FROM Stops WHERE ID = ?1", params![stop_id])
            .map(|removed| removed > 0)
            .map_err(StoreError::write("delete stop", format!("stop {stop_id}")));
        self.rollback_on_error(outcome, "delete stop")
    }

    /// Delete a bus line and, through the cascade, its route entries.
    ///
    /// Returns whether a bus line was removed.
    pub fn delete_bus_line(&mut self, bus_line_id: u32) -> Result<bool, StoreError> {
        let outcome = self
            .connection()?
            .execute("DELETE FROM BusLines WHERE ID = ?1", params![bus_line_id])
            .map(|removed| removed > 0)
            .map_err(StoreError::write(
                "delete bus line",
                format!("bus line {bus_line_id}"),
            ));
        self.rollback_on_error(outcome, "delete bus line")
    }

    /// All stored stops, ordered by id.
    pub fn get_all_stops(&self) -> Result<Vec<Stop>, StoreError> {
        query_all(
            self.connection()?,
            &format!("{SELECT_STOPS} ORDER BY ID"),
            [],
            stop_from_row,
            "read stops",
        )
    }

    /// The stop with the given id, if stored.
    pub fn get_stop_by_id(&self, stop_id: u32) -> Result<Option<Stop>, StoreError> {
        query_optional(
            self.connection()?,
            &format!("{SELECT_STOPS} WHERE ID = ?1"),
            params![stop_id],
            stop_from_row,
            "read stop by id",
        )
    }

    /// Stops whose name contains `substring`, ignoring ASCII case.
    ///
    /// The pattern is handed to `LIKE`, so `%` and `_` keep their wildcard
    /// meaning.
    pub fn get_stops_by_name(&self, substring: &str) -> Result<Vec<Stop>, StoreError> {
        query_all(
            self.connection()?,
            &format!("{SELECT_STOPS} WHERE Name LIKE ?1 ORDER BY ID"),
            params![format!("%{substring}%")],
            stop_from_row,
            "read stops by name",
        )
    }

    /// All bus lines with scalar fields only; routes are left empty.
    ///
    /// Use [`TransitDatabase::get_route_for_bus_line`] to load a line's route.
    pub fn get_bus_lines(&self) -> Result<Vec<BusLine>, StoreError> {
        query_all(
            self.connection()?,
            &format!("{SELECT_BUS_LINES} ORDER BY ID"),
            [],
            bus_line_from_row,
            "read bus lines",
        )
    }

    /// The bus line with the given id, if stored. The route is left empty.
    pub fn get_bus_line_by_id(&self, bus_line_id: u32) -> Result<Option<BusLine>, StoreError> {
        query_optional(
            self.connection()?,
            &format!("{SELECT_BUS_LINES} WHERE ID = ?1"),
            params![bus_line_id],
            bus_line_from_row,
            "read bus line by id",
        )
    }

    /// The bus line whose long name equals `long_name`, ignoring case.
    pub fn get_bus_line_by_long_name(
        &self,
        long_name: &str,
    ) -> Result<Option<BusLine>, StoreError> {
        query_optional(
            self.connection()?,
            &format!("{SELECT_BUS_LINES} WHERE LongName = ?1 COLLATE NOCASE ORDER BY ID LIMIT 1"),
            params![long_name],
            bus_line_from_row,
            "read bus line by long name",
        )
    }

    /// The bus line whose short name equals `short_name`, ignoring case.
    pub fn get_bus_line_by_short_name(
        &self,
        short_name: &str,
    ) -> Result<Option<BusLine>, StoreError> {
        query_optional(
            self.connection()?,
            &format!("{SELECT_BUS_LINES} WHERE ShortName = ?1 COLLATE NOCASE ORDER BY ID LIMIT 1"),
            params![short_name],
            bus_line_from_row,
            "read bus line by short name",
        )
    }

    /// Distinct bus lines whose route visits `stop`. Routes are left empty.
    pub fn get_bus_lines_by_stop(&self, stop: &Stop) -> Result<Vec<BusLine>, StoreError> {
        query_all(
            self.connection()?,
            "SELECT DISTINCT b.ID, b.IsActive, b.LongName, b.ShortName
                FROM BusLines AS b
                JOIN Routes AS r ON r.BusLineID = b.ID
                WHERE r.StopID = ?1
                ORDER BY b.ID",
            params![stop.id],
            bus_line_from_row,
            "read bus lines by stop",
        )
    }

    /// The stops of `bus_line`'s route, ordered by their persisted position.
    ///
    /// Fails with [`StoreError::RouteNotFound`] when no route rows exist for
    /// the line, which covers both unknown lines and lines stored without a
    /// route.
    pub fn get_route_for_bus_line(&self, bus_line: &BusLine) -> Result<Route, StoreError> {
        let stops = query_all(
            self.connection()?,
            "SELECT s.ID, s.Name, s.Latitude, s.Longitude
                FROM Routes AS r
                JOIN Stops AS s ON s.ID = r.StopID
                WHERE r.BusLineID = ?1
                ORDER BY r.RouteOrder ASC",
            params![bus_line.id],
            stop_from_row,
            "read route",
        )?;
        if stops.is_empty() {
            return Err(StoreError::RouteNotFound {
                bus_line_id: bus_line.id,
            });
        }
        Ok(Route::new(stops))
    }

    fn connection(&self) -> Result<&Connection, StoreError> {
        self.connection.as_ref().ok_or(StoreError::NotConnected)
    }

    fn rollback_on_error<T>(
        &mut self,
        outcome: Result<T, StoreError>,
        operation: &'static str,
    ) -> Result<T, StoreError> {
        match outcome {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("rolling back uncommitted changes after failing to {operation}: {err}");
                if let Err(rollback_err) = self.rollback() {
                    warn!("rollback after failing to {operation} also failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }
}

fn begin(connection: &Connection) -> Result<(), StoreError> {
    connection
        .execute_batch("BEGIN")
        .map_err(StoreError::sqlite("begin transaction"))
}

fn insert_stops(connection: &Connection, stops: &[Stop]) -> Result<(), StoreError> {
    let mut statement = connection
        .prepare_cached("INSERT INTO Stops (ID, Name, Latitude, Longitude) VALUES (?1, ?2, ?3, ?4)")
        .map_err(StoreError::sqlite("prepare stop insert"))?;

    for stop in stops {
        statement
            .execute(params![stop.id, stop.name, stop.latitude, stop.longitude])
            .map_err(StoreError::write(
                "insert stop",
                format!("stop {}", stop.id),
            ))?;
    }
    Ok(())
}

fn insert_bus_lines(connection: &Connection, bus_lines: &[BusLine]) -> Result<(), StoreError> {
    let mut insert_line = connection
        .prepare_cached(
            "INSERT INTO BusLines (ID, IsActive, LongName, ShortName) VALUES (?1, ?2, ?3, ?4)",
        )
        .map_err(StoreError::sqlite("prepare bus line insert"))?;
    let mut insert_route = connection
        .prepare_cached("INSERT INTO Routes (BusLineID, StopID, RouteOrder) VALUES (?1, ?2, ?3)")
        .map_err(StoreError::sqlite("prepare route insert"))?;

    for line in bus_lines {
        insert_line
            .execute(params![
                line.id,
                line.is_active,
                line.long_name,
                line.short_name
            ])
            .map_err(StoreError::write(
                "insert bus line",
                format!("bus line {}", line.id),
            ))?;

        for (order, stop) in (0_i64..).zip(&line.route.stops) {
            insert_route
                .execute(params![line.id, stop.id, order])
                .map_err(StoreError::write(
                    "insert route entry",
                    format!("bus line {} position {order} stop {}", line.id, stop.id),
                ))?;
        }
    }
    Ok(())
}

fn delete_all(connection: &Connection) -> Result<(), StoreError> {
    for (table, operation) in [
        ("Routes", "clear Routes"),
        ("BusLines", "clear BusLines"),
        ("Stops", "clear Stops"),
    ] {
        connection
            .execute(&format!("DELETE FROM {table}"), [])
            .map_err(StoreError::write(operation, format!("table {table}")))?;
    }
    Ok(())
}

fn stop_from_row(row: &Row<'_>) -> rusqlite::Result<Stop> {
    Ok(Stop {
        id: row.get(0)?,
        name: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
    })
}

fn bus_line_from_row(row: &Row<'_>) -> rusqlite::Result<BusLine> {
    Ok(BusLine {
        id: row.get(0)?,
        is_active: row.get(1)?,
        long_name: row.get(2)?,
        short_name: row.get(3)?,
        route: Route::empty(),
    })
}

fn query_all<T, P: Params>(
    connection: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
    operation: &'static str,
) -> Result<Vec<T>, StoreError> {
    let mut statement = connection
        .prepare_cached(sql)
        .map_err(StoreError::sqlite(operation))?;
    let rows = statement
        .query_map(params, map)
        .map_err(StoreError::sqlite(operation))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::sqlite(operation))
}

fn query_optional<T, P: Params>(
    connection: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
    operation: &'static str,
) -> Result<Option<T>, StoreError> {
    let mut statement = connection
        .prepare_cached(sql)
        .map_err(StoreError::sqlite(operation))?;
    statement
        .query_row(params, map)
        .optional()
        .map_err(StoreError::sqlite(operation))
}
