use std::io;

use camino::Utf8PathBuf;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while locating, fetching or decoding a transit feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The location looked like a URL but could not be parsed.
    #[error("invalid feed URL {location}")]
    InvalidUrl {
        /// Location as supplied.
        location: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The HTTP request failed before a response body was read.
    #[error("failed to fetch feed from {location}")]
    Fetch {
        /// Requested URL.
        location: String,
        /// Client failure.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("feed request to {location} returned {status}")]
    Status {
        /// Requested URL.
        location: String,
        /// Status returned by the server.
        status: StatusCode,
    },
    /// A local feed file could not be read.
    #[error("failed to read feed file {path}")]
    Read {
        /// File that was opened.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: io::Error,
    },
    /// The feed body is not a valid document of the expected shape.
    #[error("failed to decode feed from {location}")]
    Decode {
        /// Location the body came from.
        location: String,
        /// Decoder failure, including the offending line and column.
        #[source]
        source: serde_json::Error,
    },
    /// The HTTP client could not be configured.
    #[error("failed to build HTTP client")]
    BuildClient {
        /// Builder failure.
        #[source]
        source: reqwest::Error,
    },
    /// The Tokio runtime used for blocking requests could not start.
    #[error("failed to build Tokio runtime")]
    Runtime {
        /// Runtime failure.
        #[source]
        source: io::Error,
    },
}
