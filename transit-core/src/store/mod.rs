//! Relational persistence for the transit network.
//!
//! [`TransitDatabase`] stores stops, bus lines and the ordered `Routes` join
//! between them in SQLite. Foreign keys are enforced, so stops must be
//! written before the lines whose routes visit them, and deleting either
//! parent cascades to its route entries.
//!
//! All writes happen inside an explicit transaction. Nothing is visible to
//! other connections until [`TransitDatabase::commit`], and a failed write
//! rolls back the whole pending batch before its error is returned.
//!
//! ```text
//! Stops(ID PK, Name, Latitude, Longitude)
//! BusLines(ID PK, IsActive, LongName, ShortName)
//! Routes(ID PK, BusLineID -> BusLines.ID, StopID -> Stops.ID, RouteOrder)
//! ```

mod error;
mod schema;
mod session;
mod sqlite;

pub use error::StoreError;
pub use session::Session;
pub use sqlite::TransitDatabase;

#[cfg(test)]
mod tests;
