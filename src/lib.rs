//! plexstation - virtual TV station network on top of a Plex library
//!
//! Two pieces of real machinery, the rest is plumbing:
//! - Catalog ingestion: read-only queries against the Plex SQLite database
//!   feed a builder that reconstructs the sparse show/season/episode tree
//!   with aggregate air-date tracking.
//! - Network persistence: the station network is saved with content-hash
//!   change detection and crash-safe atomic replacement, keeping the
//!   previous generation in a `.bak` file.
//!
//! # Modules
//!
//! - `domain`: Data structures (media, schedules, stations)
//! - `source`: Read-only Plex database access
//! - `catalog`: Flat-row to tree reconstruction
//! - `store`: Durable network persistence
//! - `config`: Directory layout and argument parsing helpers
//! - `cli`: Command-line interface

pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod source;
pub mod store;

// Re-export main types at crate root for convenience
pub use catalog::{Catalog, CatalogBuilder, CatalogError};
pub use config::Config;
pub use domain::{
    Content, Episode, MediaFile, Movie, Network, ScheduledProgram, Season, StationSchedule,
    TVShow, TVStation,
};
pub use source::{MediaSource, SourceError};
pub use store::{NetworkStore, SaveOutcome, StoreError};
