//! Command-line interface for loading and querying a transit database.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;

mod error;
mod fs;
mod load;
mod query;

pub use error::CliError;

use load::LoadArgs;
use query::{ClosestArgs, LinesArgs, RecommendArgs, RouteArgs, StopsArgs};

const ARG_DATABASE: &str = "database";
const ARG_STOPS_FEED: &str = "stops-feed";
const ARG_LINES_FEED: &str = "lines-feed";
const ARG_LATITUDE: &str = "lat";
const ARG_LONGITUDE: &str = "lon";
const ARG_FROM: &str = "from";
const ARG_TO: &str = "to";
const ARG_LINE: &str = "line";
const ARG_NAME: &str = "name";
const ENV_STOPS_FEED: &str = "TRANSIT_CMDS_LOAD_STOPS_FEED";
const ENV_LINES_FEED: &str = "TRANSIT_CMDS_LOAD_LINES_FEED";
const ENV_LATITUDE: &str = "TRANSIT_CMDS_CLOSEST_LAT";
const ENV_LONGITUDE: &str = "TRANSIT_CMDS_CLOSEST_LON";
const ENV_FROM: &str = "TRANSIT_CMDS_RECOMMEND_FROM";
const ENV_TO: &str = "TRANSIT_CMDS_RECOMMEND_TO";
const ENV_LINE: &str = "TRANSIT_CMDS_ROUTE_LINE";
const ENV_NAME: &str = "TRANSIT_CMDS_STOPS_NAME";

/// Database used when neither a flag, file nor environment names one.
const DEFAULT_DATABASE: &str = "transit.db";

/// Run the transit CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging(cli.verbose);
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &mut stdout)
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let outcome =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
            .try_init();
    if let Err(err) = outcome {
        debug!("logger already installed: {err}");
    }
}

fn run_command(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Load(args) => load::run_load(args, writer),
        Command::Closest(args) => query::run_closest(args, writer),
        Command::Recommend(args) => query::run_recommend(args, writer),
        Command::Route(args) => query::run_route(args, writer),
        Command::Stops(args) => query::run_stops(args, writer),
        Command::Lines(args) => query::run_lines(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "transit",
    about = "Load a transit agency's network into SQLite and query it",
    version
)]
struct Cli {
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace the stored network with the contents of the agency feeds.
    Load(LoadArgs),
    /// Find the stop nearest to a coordinate.
    Closest(ClosestArgs),
    /// Recommend the shortest line serving two stops.
    Recommend(RecommendArgs),
    /// Print a bus line's ordered route.
    Route(RouteArgs),
    /// Search stops by name.
    Stops(StopsArgs),
    /// List bus lines.
    Lines(LinesArgs),
}

/// Write `value` as pretty JSON followed by a newline.
fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
