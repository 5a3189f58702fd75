//! Feed ingestion for the transit engine.
//!
//! Responsibilities:
//! - Decode the agency's stops and lines JSON documents.
//! - Read feeds from HTTP endpoints or local files.
//! - Assemble decoded records into [`transit_core`] domain values.
//!
//! Boundaries:
//! - Persistence and queries live in `transit-core`.
//! - The public API is synchronous; HTTP is bridged onto Tokio internally.

mod assemble;
mod error;
mod feed;
mod source;

pub use assemble::Network;
pub use error::FeedError;
pub use feed::{LineRecord, LinesDocument, RouteRecord, StopRecord, StopsDocument};
pub use source::{DEFAULT_USER_AGENT, FeedLocation, FeedReader, FeedReaderConfig};
