//! Core domain types, persistence and queries for the transit engine.
//!
//! - [`Stop`], [`Route`] and [`BusLine`] model an agency's network.
//! - [`store`] persists the network to SQLite with enforced referential
//!   integrity and explicit transactions.
//! - [`service`] wraps the store in connection-scoped operations and
//!   implements the nearest-stop and recommended-line queries.
#![forbid(unsafe_code)]

mod bus_line;
mod route;
mod stop;

#[cfg(feature = "store-sqlite")]
pub mod service;
#[cfg(feature = "store-sqlite")]
pub mod store;

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;

pub use bus_line::BusLine;
pub use route::Route;
pub use stop::Stop;

#[cfg(feature = "store-sqlite")]
pub use service::{BusLineService, ServiceError};
#[cfg(feature = "store-sqlite")]
pub use store::{Session, StoreError, TransitDatabase};
