//! Media catalog types: movies, shows, seasons, episodes.
//!
//! Seasons and episodes are index-addressable sparse sequences: slot `i`
//! holds season/episode number `i`, and a slot with no entry holds `None`.
//! The sequence length is always `max index seen + 1`; placeholders are
//! never removed or compacted.
//!
//! Episodes carry their numeric coordinates (`season_number`,
//! `episode_number`) instead of references back to their owners, keeping
//! the object graph acyclic.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A playable file on disk, as recorded by Plex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: i64,

    /// Absolute path to the file (after optional path translation)
    pub file: String,

    /// Playback duration; zero when Plex has no media item for the entry
    pub duration: Duration,
}

/// A single episode of a show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,

    /// Original air date, if Plex knows it
    pub aired_at: Option<DateTime<Utc>>,

    pub media: MediaFile,
    pub season_number: usize,
    pub episode_number: usize,
}

/// One season of a show; `episodes[i]` holds episode number `i`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Season {
    pub season_number: usize,
    pub episodes: Vec<Option<Episode>>,
}

impl Season {
    /// Create an empty season with the given number.
    pub fn new(season_number: usize) -> Self {
        Self {
            season_number,
            episodes: Vec::new(),
        }
    }

    /// Number of real episodes, absent slots excluded.
    pub fn episode_count(&self) -> usize {
        self.episodes.iter().flatten().count()
    }
}

/// A show with its full (possibly sparse) season tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TVShow {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub tagline: Option<String>,

    /// Genre tags in first-seen order, deduplicated
    pub genres: Vec<String>,

    pub released_at: Option<DateTime<Utc>>,

    /// `seasons[i]` holds season number `i`
    pub seasons: Vec<Season>,

    /// Min/max `aired_at` over all episodes; both `None` when no episode
    /// carries an air date
    pub first_aired: Option<DateTime<Utc>>,
    pub last_aired: Option<DateTime<Utc>>,
}

impl TVShow {
    /// Total real episodes across all seasons.
    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(Season::episode_count).sum()
    }
}

/// A standalone movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub tagline: Option<String>,
    pub genres: Vec<String>,
    pub released_at: Option<DateTime<Utc>>,
    pub media: MediaFile,
}

/// A schedulable piece of content: either a movie or an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Content {
    Movie(Movie),
    Episode(Episode),
}

impl Content {
    /// The media file behind this content.
    pub fn media(&self) -> &MediaFile {
        match self {
            Content::Movie(movie) => &movie.media,
            Content::Episode(episode) => &episode.media,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Content::Movie(movie) => &movie.title,
            Content::Episode(episode) => &episode.title,
        }
    }
}
