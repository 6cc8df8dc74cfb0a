//! Data structures for the media catalog and the station network.

pub mod media;
pub mod schedule;
pub mod station;

pub use media::{Content, Episode, MediaFile, Movie, Season, TVShow};
pub use schedule::{ScheduledProgram, StationSchedule};
pub use station::{Network, TVStation};
