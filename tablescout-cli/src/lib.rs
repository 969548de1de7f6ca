//! Command-line interface for running discovery queries offline.
//!
//! The `discover` subcommand loads an entity dataset from a JSON file
//! into the in-memory store, executes one discovery request against
//! it, and writes the resulting page to stdout as JSON. Options can
//! come from CLI flags, configuration files, or environment variables.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

use tablescout_core::{Entity, FilterSpec};
use tablescout_query::{
    DiscoveryCoordinator, DiscoveryError, DiscoveryRequest, DiscoveryResponse, MemoryStore,
    PageRequest,
};

const ARG_ENTITIES: &str = "entities";
const ARG_LAT: &str = "lat";
const ARG_LNG: &str = "lng";
const ENV_ENTITIES: &str = "TABLESCOUT_CMDS_DISCOVER_ENTITIES";
const ENV_LAT: &str = "TABLESCOUT_CMDS_DISCOVER_LAT";
const ENV_LNG: &str = "TABLESCOUT_CMDS_DISCOVER_LNG";

const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Run the CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Discover(args) => {
            let response = run_discover(args)?;
            let stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(stdout, &response).map_err(CliError::Output)?;
            println!();
        }
    }
    Ok(())
}

fn run_discover(args: DiscoverArgs) -> Result<DiscoveryResponse, CliError> {
    let config = args.into_config()?;
    let entities = load_entities(&config.entities)?;
    log::debug!("loaded {} entities from {:?}", entities.len(), config.entities);

    let engine = DiscoveryCoordinator::new(MemoryStore::new(entities));
    let request = config.into_request();
    engine.execute(&request).map_err(CliError::Discovery)
}

fn load_entities(path: &Path) -> Result<Vec<Entity>, CliError> {
    if !path.is_file() {
        return Err(CliError::MissingSourceFile {
            field: ARG_ENTITIES,
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| CliError::EntityFileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::EntityFileDecode {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Parser)]
#[command(
    name = "tablescout",
    about = "Offline discovery queries over a JSON entity dataset",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute one discovery request against an entity file.
    Discover(DiscoverArgs),
}

/// CLI arguments for the `discover` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Run a discovery query over a JSON entity dataset. Options \
                 can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Execute one discovery request against an entity file"
)]
#[ortho_config(prefix = "TABLESCOUT")]
struct DiscoverArgs {
    /// Path to the JSON entity dataset.
    #[arg(long = ARG_ENTITIES, value_name = "path")]
    #[serde(default)]
    entities: Option<PathBuf>,
    /// Viewer latitude in degrees.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    lat: Option<f64>,
    /// Viewer longitude in degrees.
    #[arg(long = ARG_LNG, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    lng: Option<f64>,
    /// Search radius in kilometres; defaults to 10.
    #[arg(long, value_name = "km")]
    #[serde(default)]
    radius_km: Option<f64>,
    /// Free-text search query.
    #[arg(long, value_name = "text")]
    #[serde(default)]
    query: Option<String>,
    /// Page size; zero disables the limit.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    page_size: Option<u64>,
    /// Zero-based page index.
    #[arg(long, value_name = "index")]
    #[serde(default)]
    page_index: Option<u64>,
    /// Admit only entities with reservations available.
    #[arg(long)]
    #[serde(default)]
    reservable_only: bool,
    /// Admit only entities known to be open right now.
    #[arg(long)]
    #[serde(default)]
    open_now_only: bool,
    /// Admit only favourited entities.
    #[arg(long)]
    #[serde(default)]
    favorites_only: bool,
}

impl DiscoverArgs {
    fn into_config(self) -> Result<DiscoverConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DiscoverConfig::try_from(merged)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DiscoverConfig {
    entities: PathBuf,
    lat: f64,
    lng: f64,
    radius_km: f64,
    query: Option<String>,
    filters: FilterSpec,
    page: PageRequest,
}

impl DiscoverConfig {
    fn into_request(self) -> DiscoveryRequest {
        let mut request = DiscoveryRequest::centered(self.lat, self.lng, self.radius_km);
        request.search_query = self.query;
        request.filters = self.filters;
        request.page = self.page;
        request
    }
}

impl TryFrom<DiscoverArgs> for DiscoverConfig {
    type Error = CliError;

    fn try_from(args: DiscoverArgs) -> Result<Self, Self::Error> {
        let entities = args.entities.ok_or(CliError::MissingArgument {
            field: ARG_ENTITIES,
            env: ENV_ENTITIES,
        })?;
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_LAT,
            env: ENV_LAT,
        })?;
        let lng = args.lng.ok_or(CliError::MissingArgument {
            field: ARG_LNG,
            env: ENV_LNG,
        })?;
        let defaults = PageRequest::default();
        Ok(Self {
            entities,
            lat,
            lng,
            radius_km: args.radius_km.unwrap_or(DEFAULT_RADIUS_KM),
            query: args.query,
            filters: FilterSpec {
                reservable_only: args.reservable_only,
                open_now_only: args.open_now_only,
                favorites_only: args.favorites_only,
                ..FilterSpec::default()
            },
            page: PageRequest {
                size: args.page_size.unwrap_or(defaults.size),
                index: args.page_index.unwrap_or(defaults.index),
            },
        })
    }
}

/// Errors emitted by the CLI.
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
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile { field: &'static str, path: PathBuf },
    /// The entity file could not be read.
    #[error("failed to read entity file {path:?}")]
    EntityFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The entity file is not a valid JSON entity list.
    #[error("failed to decode entity file {path:?}")]
    EntityFileDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The discovery run itself failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// Writing the response to stdout failed.
    #[error("failed to write the response")]
    Output(#[source] serde_json::Error),
}
