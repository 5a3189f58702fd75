//! Error types emitted by the transit CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use transit_core::ServiceError;
use transit_data::FeedError;

/// Errors emitted by the transit CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A feed location could not be parsed.
    #[error("invalid {field} location: {source}")]
    InvalidFeedLocation {
        field: &'static str,
        #[source]
        source: FeedError,
    },
    /// Creating the database's parent directory failed.
    #[error("failed to create parent directory for {path:?}: {source}")]
    CreateDatabaseDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading or decoding a feed failed.
    #[error(transparent)]
    Feed(#[from] FeedError),
    /// The transit database rejected the request.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The requested bus line is not stored.
    #[error("bus line {bus_line_id} is not in the database")]
    UnknownBusLine { bus_line_id: u32 },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
