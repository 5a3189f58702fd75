//! Load command implementation for the transit CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use transit_core::BusLineService;
use transit_data::{FeedLocation, FeedReader};

use crate::{
    ARG_DATABASE, ARG_LINES_FEED, ARG_STOPS_FEED, CliError, DEFAULT_DATABASE, ENV_LINES_FEED,
    ENV_STOPS_FEED, fs::ensure_parent_dir, write_json,
};

/// CLI arguments for the `load` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Fetch the agency's stops and lines feeds and replace the \
                 stored network with them in a single transaction. Feeds \
                 may be http(s) URLs or local files.",
    about = "Load the network from the agency feeds"
)]
#[ortho_config(prefix = "TRANSIT")]
pub(crate) struct LoadArgs {
    /// SQLite database to write.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// URL or path of the stops (and routes) feed.
    #[arg(long = ARG_STOPS_FEED, value_name = "location")]
    #[serde(default)]
    pub(crate) stops_feed: Option<String>,
    /// URL or path of the bus lines feed.
    #[arg(long = ARG_LINES_FEED, value_name = "location")]
    #[serde(default)]
    pub(crate) lines_feed: Option<String>,
}

impl LoadArgs {
    pub(crate) fn into_config(self) -> Result<LoadConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LoadConfig::try_from(merged)
    }
}

/// Resolved `load` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) stops_feed: FeedLocation,
    pub(crate) lines_feed: FeedLocation,
}

impl TryFrom<LoadArgs> for LoadConfig {
    type Error = CliError;

    fn try_from(args: LoadArgs) -> Result<Self, Self::Error> {
        let stops_feed = args.stops_feed.ok_or(CliError::MissingArgument {
            field: ARG_STOPS_FEED,
            env: ENV_STOPS_FEED,
        })?;
        let lines_feed = args.lines_feed.ok_or(CliError::MissingArgument {
            field: ARG_LINES_FEED,
            env: ENV_LINES_FEED,
        })?;
        Ok(Self {
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            stops_feed: parse_location(&stops_feed, ARG_STOPS_FEED)?,
            lines_feed: parse_location(&lines_feed, ARG_LINES_FEED)?,
        })
    }
}

fn parse_location(location: &str, field: &'static str) -> Result<FeedLocation, CliError> {
    location
        .parse()
        .map_err(|source| CliError::InvalidFeedLocation { field, source })
}

/// Row counts written by a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct LoadSummary {
    pub(crate) stops: usize,
    pub(crate) lines: usize,
}

pub(crate) fn run_load(args: LoadArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let summary = execute_load(&config)?;
    write_json(writer, &summary)
}

pub(crate) fn execute_load(config: &LoadConfig) -> Result<LoadSummary, CliError> {
    let reader = FeedReader::new()?;
    let network = reader.load_network(&config.stops_feed, &config.lines_feed)?;

    ensure_parent_dir(&config.database).map_err(|source| CliError::CreateDatabaseDir {
        path: config.database.clone(),
        source,
    })?;
    let mut service = BusLineService::open(config.database.as_std_path());
    service.replace_all(&network.stops, &network.bus_lines)?;
    info!(
        "network from {} and {} stored in {}",
        config.stops_feed, config.lines_feed, config.database
    );

    Ok(LoadSummary {
        stops: network.stops.len(),
        lines: network.bus_lines.len(),
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<LoadConfig, CliError> {
    let merged = LoadArgs::merge_from_layers(layers).map_err(CliError::from)?;
    LoadConfig::try_from(merged)
}
