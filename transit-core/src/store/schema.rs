use rusqlite::Connection;

use super::StoreError;

/// Create the transit tables if they do not exist yet.
///
/// `Routes` references both parent tables and is therefore created last.
/// Every statement is `IF NOT EXISTS`, so repeated calls are no-ops.
pub(super) fn create_tables(connection: &Connection) -> Result<(), StoreError> {
    run_schema_step(
        connection,
        "create Stops",
        "CREATE TABLE IF NOT EXISTS Stops (
            ID INTEGER PRIMARY KEY,
            Name TEXT NOT NULL,
            Latitude REAL NOT NULL,
            Longitude REAL NOT NULL
        )",
    )?;
    run_schema_step(
        connection,
        "create BusLines",
        "CREATE TABLE IF NOT EXISTS BusLines (
            ID INTEGER PRIMARY KEY,
            IsActive BOOLEAN NOT NULL,
            LongName TEXT NOT NULL,
            ShortName TEXT NOT NULL
        )",
    )?;
    run_schema_step(
        connection,
        "create Routes",
        "CREATE TABLE IF NOT EXISTS Routes (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            BusLineID INTEGER NOT NULL,
            StopID INTEGER NOT NULL,
            RouteOrder INTEGER NOT NULL CHECK (RouteOrder >= 0),
            UNIQUE (BusLineID, RouteOrder),
            FOREIGN KEY (BusLineID) REFERENCES BusLines(ID) ON DELETE CASCADE,
            FOREIGN KEY (StopID) REFERENCES Stops(ID) ON DELETE CASCADE
        )",
    )?;
    run_schema_step(
        connection,
        "index Routes by stop",
        "CREATE INDEX IF NOT EXISTS idx_routes_stop ON Routes(StopID, BusLineID)",
    )
}

fn run_schema_step(
    connection: &Connection,
    step: &'static str,
    sql: &str,
) -> Result<(), StoreError> {
    connection
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| StoreError::Schema { step, source })
}
