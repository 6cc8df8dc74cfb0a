//! Command-line interface for plexstation.
//!
//! Provides commands for running the full lifecycle, inspecting the media
//! catalog, and managing the station network.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use chrono::Utc;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::{self, Config};
use crate::domain::{StationSchedule, TVStation};
use crate::source::MediaSource;
use crate::store::{NetworkStore, SaveOutcome};

/// plexstation - virtual TV station network on top of a Plex library
#[derive(Parser, Debug)]
#[command(name = "plexstation")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub options: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Working directory (conf/, bin/ and tmp/ are created inside)
    #[arg(
        short,
        long,
        env = "PLEXSTATION_DIR",
        default_value = "~/.plexstation"
    )]
    pub directory: String,

    /// Network name
    #[arg(short, long, env = "PLEXSTATION_NETWORK", default_value = "plexstation")]
    pub network: String,

    /// Path to the Plex library database (default: the platform's Plex
    /// install location)
    #[arg(long, env = "PLEX_DB")]
    pub plex_db: Option<PathBuf>,

    /// Translate media paths to a different root (e.g. '/mnt/plex -> /data/plex')
    #[arg(long, value_parser = config::parse_path_translation)]
    pub path_translate: Option<(String, String)>,
}

impl GlobalOptions {
    fn into_config(self) -> Config {
        Config::new(
            &self.directory,
            self.network,
            self.plex_db,
            self.path_translate,
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full lifecycle: load the network, ingest the Plex catalog,
    /// save the network
    Run,

    /// Ingest the Plex catalog and print a summary
    Catalog,

    /// List stations in the network
    Stations,

    /// Add a station to the network
    AddStation {
        /// Station name
        name: String,

        /// Station description
        #[arg(long)]
        description: Option<String>,

        /// ISO country code
        #[arg(long)]
        country: Option<String>,

        /// Broadcast language
        #[arg(long)]
        language: Option<String>,

        /// Tags to apply (comma-separated)
        #[arg(short, long)]
        tags: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let config = self.options.into_config();
        match self.command {
            Commands::Run => run(&config).await,
            Commands::Catalog => show_catalog(&config),
            Commands::Stations => list_stations(&config).await,
            Commands::AddStation {
                name,
                description,
                country,
                language,
                tags,
            } => add_station(&config, name, description, country, language, tags).await,
        }
    }
}

/// Full process lifecycle: network load at startup, one ingestion pass,
/// network save at shutdown.
async fn run(config: &Config) -> Result<()> {
    config.ensure_dirs().await?;

    let store = NetworkStore::new(&config.conf_dir, &config.network);
    let mut network = store.load().await?;
    info!(
        "network '{}' loaded with {} station(s)",
        network.name,
        network.stations.len()
    );

    let catalog = load_catalog(config)?;
    info!(
        "catalog ready: {} movie(s), {} show(s), {} episode(s)",
        catalog.movies.len(),
        catalog.shows.len(),
        catalog.episode_count()
    );

    // Station schedules are filled in by placement logic outside this
    // binary; persist whatever state the run produced.
    match store.save(&mut network).await? {
        SaveOutcome::Written => info!("network saved"),
        SaveOutcome::Unchanged => debug!("network unchanged"),
    }
    Ok(())
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    let source = MediaSource::open(config.require_plex_db()?, config.path_translate.clone())?;
    Ok(source.load_catalog()?)
}

/// Print a summary of the ingested catalog.
fn show_catalog(config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;

    println!("Movies: {}", catalog.movies.len());
    for movie in &catalog.movies {
        println!("  {} [{}]", movie.title, movie.genres.join(", "));
    }

    println!("Shows: {}", catalog.shows.len());
    for show in &catalog.shows {
        let aired = match (show.first_aired, show.last_aired) {
            (Some(first), Some(last)) => {
                format!(" aired {} - {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))
            }
            _ => String::new(),
        };
        println!(
            "  {} ({} season(s), {} episode(s)){}",
            show.title,
            show.seasons.len(),
            show.episode_count(),
            aired
        );
    }

    Ok(())
}

/// List the stations in the persisted network.
async fn list_stations(config: &Config) -> Result<()> {
    let store = NetworkStore::new(&config.conf_dir, &config.network);
    let network = store.load().await?;

    if network.stations.is_empty() {
        println!("No stations in network '{}'", network.name);
        return Ok(());
    }

    println!("Network '{}':", network.name);
    for station in &network.stations {
        let state = if station.active { "active" } else { "inactive" };
        println!(
            "  {} ({}, {} program(s) scheduled)",
            station.name,
            state,
            station.schedule.programs.len()
        );
    }
    Ok(())
}

/// Append a new station and persist the network.
async fn add_station(
    config: &Config,
    name: String,
    description: Option<String>,
    country: Option<String>,
    language: Option<String>,
    tags: Option<String>,
) -> Result<()> {
    config.ensure_dirs().await?;

    let store = NetworkStore::new(&config.conf_dir, &config.network);
    let mut network = store.load().await?;

    let mut station = TVStation::new(name, StationSchedule::new(Utc::now()));
    station.description = description;
    station.country = country;
    station.language = language;
    station.tags = tags.map(|t| t.split(',').map(|s| s.trim().to_string()).collect());

    info!("adding station '{}'", station.name);
    network.stations.push(station);
    store.save(&mut network).await?;
    Ok(())
}
