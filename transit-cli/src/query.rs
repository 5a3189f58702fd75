//! Read-only query commands for the transit CLI.
//!
//! Each subcommand resolves its layered arguments into an immutable config,
//! opens the database through [`BusLineService`] and prints JSON.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use transit_core::{BusLine, BusLineService, Stop};

use crate::{
    ARG_DATABASE, ARG_FROM, ARG_LATITUDE, ARG_LINE, ARG_LONGITUDE, ARG_NAME, ARG_TO, CliError,
    DEFAULT_DATABASE, ENV_FROM, ENV_LATITUDE, ENV_LINE, ENV_LONGITUDE, ENV_NAME, ENV_TO,
    write_json,
};

fn database_or_default(database: Option<Utf8PathBuf>) -> Utf8PathBuf {
    database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE))
}

fn open_service(database: &Utf8PathBuf) -> BusLineService {
    BusLineService::open(database.as_std_path())
}

/// CLI arguments for the `closest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print the stop nearest to a coordinate, or null")]
#[ortho_config(prefix = "TRANSIT")]
pub(crate) struct ClosestArgs {
    /// SQLite database to query.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Latitude in degrees.
    #[arg(long = ARG_LATITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude in degrees.
    #[arg(long = ARG_LONGITUDE, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
}

/// Resolved `closest` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ClosestConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
}

impl TryFrom<ClosestArgs> for ClosestConfig {
    type Error = CliError;

    fn try_from(args: ClosestArgs) -> Result<Self, Self::Error> {
        let latitude = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LATITUDE,
            env: ENV_LATITUDE,
        })?;
        let longitude = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_LONGITUDE,
            env: ENV_LONGITUDE,
        })?;
        Ok(Self {
            database: database_or_default(args.database),
            latitude,
            longitude,
        })
    }
}

pub(crate) fn run_closest(args: ClosestArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = ClosestConfig::try_from(merged)?;
    let closest = execute_closest(&config)?;
    write_json(writer, &closest)
}

pub(crate) fn execute_closest(config: &ClosestConfig) -> Result<Option<Stop>, CliError> {
    let mut service = open_service(&config.database);
    Ok(service.get_closest_stop(config.latitude, config.longitude)?)
}

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print the bus line with the shortest route that visits \
                 both stops, including its route, or null when no line \
                 serves both. Direction of travel is not considered.",
    about = "Recommend a bus line between two stops"
)]
#[ortho_config(prefix = "TRANSIT")]
pub(crate) struct RecommendArgs {
    /// SQLite database to query.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Id of the departure stop.
    #[arg(long = ARG_FROM, value_name = "stop id")]
    #[serde(default)]
    pub(crate) from: Option<u32>,
    /// Id of the arrival stop.
    #[arg(long = ARG_TO, value_name = "stop id")]
    #[serde(default)]
    pub(crate) to: Option<u32>,
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecommendConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) from: u32,
    pub(crate) to: u32,
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let from = args.from.ok_or(CliError::MissingArgument {
            field: ARG_FROM,
            env: ENV_FROM,
        })?;
        let to = args.to.ok_or(CliError::MissingArgument {
            field: ARG_TO,
            env: ENV_TO,
        })?;
        Ok(Self {
            database: database_or_default(args.database),
            from,
            to,
        })
    }
}

pub(crate) fn run_recommend(args: RecommendArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = RecommendConfig::try_from(merged)?;
    let line = execute_recommend(&config)?;
    write_json(writer, &line)
}

pub(crate) fn execute_recommend(config: &RecommendConfig) -> Result<Option<BusLine>, CliError> {
    let mut service = open_service(&config.database);
    // Stops compare by id; the service rejects ids it does not store.
    let source = Stop::new(config.from, "", 0.0, 0.0);
    let destination = Stop::new(config.to, "", 0.0, 0.0);
    Ok(service.get_recommended_bus_line(&source, &destination)?)
}

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print the stops of a bus line's route in travel order")]
#[ortho_config(prefix = "TRANSIT")]
pub(crate) struct RouteArgs {
    /// SQLite database to query.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Id of the bus line.
    #[arg(long = ARG_LINE, value_name = "line id")]
    #[serde(default)]
    pub(crate) line: Option<u32>,
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) line: u32,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let line = args.line.ok_or(CliError::MissingArgument {
            field: ARG_LINE,
            env: ENV_LINE,
        })?;
        Ok(Self {
            database: database_or_default(args.database),
            line,
        })
    }
}

pub(crate) fn run_route(args: RouteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = RouteConfig::try_from(merged)?;
    let stops = execute_route(&config)?;
    write_json(writer, &stops)
}

pub(crate) fn execute_route(config: &RouteConfig) -> Result<Vec<Stop>, CliError> {
    let mut service = open_service(&config.database);
    let line = service
        .get_bus_line_by_id(config.line)?
        .ok_or(CliError::UnknownBusLine {
            bus_line_id: config.line,
        })?;
    Ok(service.get_route(&line)?.stops)
}

/// CLI arguments for the `stops` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print stops whose name contains a substring, ignoring case")]
#[ortho_config(prefix = "TRANSIT")]
pub(crate) struct StopsArgs {
    /// SQLite database to query.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Substring to look for.
    #[arg(long = ARG_NAME, value_name = "text")]
    #[serde(default)]
    pub(crate) name: Option<String>,
}

/// Resolved `stops` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StopsConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) name: String,
}

impl TryFrom<StopsArgs> for StopsConfig {
    type Error = CliError;

    fn try_from(args: StopsArgs) -> Result<Self, Self::Error> {
        let name = args.name.ok_or(CliError::MissingArgument {
            field: ARG_NAME,
            env: ENV_NAME,
        })?;
        Ok(Self {
            database: database_or_default(args.database),
            name,
        })
    }
}

pub(crate) fn run_stops(args: StopsArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let config = StopsConfig::try_from(merged)?;
    let mut service = open_service(&config.database);
    let stops = service.get_stops_by_name(&config.name)?;
    write_json(writer, &stops)
}

/// CLI arguments for the `lines` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print every bus line, optionally with its route")]
#[ortho_config(prefix = "TRANSIT")]
pub(crate) struct LinesArgs {
    /// SQLite database to query.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Attach each line's route to the output.
    #[arg(long)]
    #[serde(default)]
    pub(crate) with_routes: bool,
}

/// Resolved `lines` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinesConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) with_routes: bool,
}

impl From<LinesArgs> for LinesConfig {
    fn from(args: LinesArgs) -> Self {
        Self {
            database: database_or_default(args.database),
            with_routes: args.with_routes,
        }
    }
}

pub(crate) fn run_lines(args: LinesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let lines = execute_lines(&LinesConfig::from(merged))?;
    write_json(writer, &lines)
}

pub(crate) fn execute_lines(config: &LinesConfig) -> Result<Vec<BusLine>, CliError> {
    let mut service = open_service(&config.database);
    let lines = if config.with_routes {
        service.get_bus_lines_with_routes()?
    } else {
        service.get_bus_lines()?
    };
    Ok(lines)
}
