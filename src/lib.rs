//! Facade crate for the transit engine.
//!
//! This crate re-exports the core domain types and exposes the persistent store
//! and feed ingestion behind feature flags.

#![forbid(unsafe_code)]

pub use transit_core::{BusLine, Route, Stop};

#[cfg(feature = "store-sqlite")]
pub use transit_core::{BusLineService, ServiceError, Session, StoreError, TransitDatabase};

#[cfg(feature = "feeds")]
pub use transit_data::{FeedError, FeedLocation, FeedReader, Network};
