//! Read-only access to the Plex library database.
//!
//! Every query opens its own read-only connection and releases it when the
//! rows have been fetched. The database is validated once, before any query
//! runs: the path must be an existing SQLite file exposing the five tables
//! the queries touch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags};
use thiserror::Error;
use tracing::debug;

use crate::catalog::{Catalog, CatalogBuilder, CatalogError};
use crate::domain::{Episode, MediaFile, Movie, TVShow};

/// Tables every Plex library database must expose.
const REQUIRED_TABLES: [&str; 5] = [
    "media_parts",
    "media_items",
    "metadata_items",
    "taggings",
    "tags",
];

// Library section / metadata type discriminators used by Plex.
const MOVIE_SECTION: i64 = 1;
const SHOW_SECTION: i64 = 2;
const METADATA_MOVIE: i64 = 1;
const METADATA_SHOW: i64 = 2;
const METADATA_EPISODE: i64 = 4;

/// Air dates before 1910 are Plex placeholder values, not real dates.
const EARLIEST_PLAUSIBLE_SECS: i64 = -1_893_456_000;

/// Errors raised while validating or querying the Plex database.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("'{0}' does not point to a valid file")]
    NotAFile(PathBuf),

    #[error("'{0}' does not appear to be a valid SQLite database")]
    InvalidDatabase(PathBuf),

    #[error("'{path}' does not have the required Plex table '{table}'")]
    MissingTable { path: PathBuf, table: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Read-only handle to a validated Plex database.
#[derive(Debug, Clone)]
pub struct MediaSource {
    db_path: PathBuf,
    path_translate: Option<(String, String)>,
}

impl MediaSource {
    /// Validate the database and return a source for it.
    ///
    /// `path_translate` rewrites the leading `prefix` of every returned
    /// media file path to `replacement`; paths without the prefix pass
    /// through unchanged.
    pub fn open(
        db_path: impl Into<PathBuf>,
        path_translate: Option<(String, String)>,
    ) -> Result<Self, SourceError> {
        let db_path = db_path.into();
        validate_database(&db_path)?;
        Ok(Self {
            db_path,
            path_translate,
        })
    }

    fn connect(&self) -> Result<Connection, SourceError> {
        let conn =
            Connection::open_with_flags(&self.db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(conn)
    }

    /// Fetch everything and assemble the full catalog.
    pub fn load_catalog(&self) -> Result<Catalog, SourceError> {
        debug!("loading Plex database {}", self.db_path.display());
        let mut builder = CatalogBuilder::new();
        builder.add_movies(self.fetch_movies()?);
        builder.add_shows(self.fetch_shows()?);
        self.fetch_episodes(&mut builder)?;
        debug!("loaded Plex database");
        Ok(builder.finish())
    }

    /// Fetch all movies, one per metadata row.
    pub fn fetch_movies(&self) -> Result<Vec<Movie>, SourceError> {
        debug!("fetching all movies");
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT
                 mi.id AS movie_id,
                 mi.title,
                 GROUP_CONCAT(t.tag, ',') AS genres,
                 mi.tagline,
                 mi.summary,
                 mi.originally_available_at,
                 mp.file,
                 m.id AS media_id,
                 COALESCE(m.duration, 0) AS duration
             FROM metadata_items AS mi
             LEFT JOIN media_items AS m ON mi.id = m.metadata_item_id
             LEFT JOIN media_parts AS mp ON m.id = mp.media_item_id
             LEFT JOIN taggings tg ON mi.id = tg.metadata_item_id
             LEFT JOIN tags AS t ON tg.tag_id = t.id AND t.tag_type = 1
             WHERE mi.library_section_id = ?1 AND mi.metadata_type = ?2
             GROUP BY mi.id",
        )?;

        let rows = stmt.query_map(params![MOVIE_SECTION, METADATA_MOVIE], |row| {
            Ok(Movie {
                id: row.get("movie_id")?,
                title: row.get("title")?,
                summary: row.get("summary")?,
                tagline: row.get("tagline")?,
                genres: split_genres(row.get::<_, Option<String>>("genres")?.as_deref()),
                released_at: row
                    .get::<_, Option<i64>>("originally_available_at")?
                    .and_then(from_timestamp),
                media: MediaFile {
                    id: row.get::<_, Option<i64>>("media_id")?.unwrap_or_default(),
                    file: row.get::<_, Option<String>>("file")?.unwrap_or_default(),
                    duration: duration_from_millis(row.get("duration")?),
                },
            })
        })?;

        let mut movies = rows.collect::<Result<Vec<_>, _>>()?;
        for movie in &mut movies {
            movie.media.file = self.translate_path(std::mem::take(&mut movie.media.file));
        }
        Ok(movies)
    }

    /// Fetch all shows with empty season trees.
    pub fn fetch_shows(&self) -> Result<Vec<TVShow>, SourceError> {
        debug!("fetching all TV shows");
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT
                 mi.id AS show_id,
                 mi.title AS show_title,
                 GROUP_CONCAT(t.tag, ',') AS genres,
                 mi.tagline AS show_tagline,
                 mi.summary AS show_summary,
                 mi.originally_available_at AS show_release_date
             FROM metadata_items AS mi
             LEFT JOIN taggings tg ON mi.id = tg.metadata_item_id
             LEFT JOIN tags AS t ON tg.tag_id = t.id AND t.tag_type = 1
             WHERE mi.library_section_id = ?1 AND mi.metadata_type = ?2
             GROUP BY mi.id",
        )?;

        let rows = stmt.query_map(params![SHOW_SECTION, METADATA_SHOW], |row| {
            Ok(TVShow {
                id: row.get("show_id")?,
                title: row.get("show_title")?,
                summary: row.get("show_summary")?,
                tagline: row.get("show_tagline")?,
                genres: split_genres(row.get::<_, Option<String>>("genres")?.as_deref()),
                // Undated shows get the epoch so "present but undated" stays
                // distinguishable from "no show at all"
                released_at: row
                    .get::<_, Option<i64>>("show_release_date")?
                    .and_then(from_timestamp)
                    .or_else(|| DateTime::from_timestamp(0, 0)),
                seasons: Vec::new(),
                first_aired: None,
                last_aired: None,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Fetch all episode rows, ordered by show then season index then
    /// episode index, and place each one through the builder.
    pub fn fetch_episodes(&self, builder: &mut CatalogBuilder) -> Result<(), SourceError> {
        debug!("fetching all episodes");
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT
                 mi.id AS episode_id,
                 mip.parent_id AS show_id,
                 mi.title AS episode_title,
                 mi.summary AS episode_summary,
                 mi.originally_available_at AS aired_at,
                 mi.\"index\" AS episode_number,
                 mip.\"index\" AS season_number,
                 m.duration AS episode_duration,
                 mp.file AS episode_file
             FROM metadata_items AS mi
             JOIN metadata_items AS mip ON mi.parent_id = mip.id
             LEFT JOIN media_items AS m ON mi.id = m.metadata_item_id
             LEFT JOIN media_parts AS mp ON m.id = mp.media_item_id
             WHERE mi.library_section_id = ?1 AND mi.metadata_type = ?2
             ORDER BY show_id, season_number, episode_number",
        )?;

        let rows = stmt.query_map(params![SHOW_SECTION, METADATA_EPISODE], |row| {
            let episode_id: i64 = row.get("episode_id")?;
            let episode = Episode {
                id: episode_id,
                title: row.get("episode_title")?,
                summary: row.get("episode_summary")?,
                aired_at: row
                    .get::<_, Option<i64>>("aired_at")?
                    .and_then(from_timestamp),
                media: MediaFile {
                    id: episode_id,
                    file: row
                        .get::<_, Option<String>>("episode_file")?
                        .unwrap_or_default(),
                    duration: duration_from_millis(
                        row.get::<_, Option<i64>>("episode_duration")?.unwrap_or(0),
                    ),
                },
                season_number: row.get::<_, u32>("season_number")? as usize,
                episode_number: row.get::<_, u32>("episode_number")? as usize,
            };
            let show_id: i64 = row.get("show_id")?;
            Ok((show_id, episode))
        })?;

        for row in rows {
            let (show_id, mut episode) = row?;
            episode.media.file = self.translate_path(std::mem::take(&mut episode.media.file));
            builder.place_episode(show_id, episode)?;
        }
        Ok(())
    }

    fn translate_path(&self, path: String) -> String {
        match &self.path_translate {
            Some((prefix, replacement)) if path.starts_with(prefix.as_str()) => {
                format!("{}{}", replacement, &path[prefix.len()..])
            }
            _ => path,
        }
    }
}

/// Check that the path is an SQLite file carrying all required Plex tables.
fn validate_database(path: &Path) -> Result<(), SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotAFile(path.to_path_buf()));
    }

    let invalid = |_| SourceError::InvalidDatabase(path.to_path_buf());
    let conn =
        Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(invalid)?;
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
        .map_err(invalid)?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(invalid)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(invalid)?;

    for required in REQUIRED_TABLES {
        if !tables.iter().any(|t| t == required) {
            return Err(SourceError::MissingTable {
                path: path.to_path_buf(),
                table: required.to_string(),
            });
        }
    }

    Ok(())
}

/// Split a GROUP_CONCAT genre field into a deduplicated list, preserving
/// first-seen order.
fn split_genres(raw: Option<&str>) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    if let Some(raw) = raw {
        for tag in raw.split(',') {
            let tag = tag.trim();
            if !tag.is_empty() && !genres.iter().any(|g| g == tag) {
                genres.push(tag.to_string());
            }
        }
    }
    genres
}

fn duration_from_millis(millis: i64) -> Duration {
    Duration::from_millis(millis.max(0) as u64)
}

/// Interpret a Plex timestamp column. Zero and implausibly old values
/// (up to and including the 1910 cutoff) are placeholders for "not set".
fn from_timestamp(secs: i64) -> Option<DateTime<Utc>> {
    if secs == 0 || secs <= EARLIEST_PLAUSIBLE_SECS {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}
