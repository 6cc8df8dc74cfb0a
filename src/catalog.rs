//! Flat-row to tree reconstruction for the media catalog.
//!
//! Episode rows arrive pre-ordered by show, then season index, then episode
//! index. The builder grows each show's sparse season/episode vectors to fit
//! the indices it sees: a missing season becomes an empty `Season`, a missing
//! episode slot becomes `None`. Final tree shape and aired-date aggregates do
//! not depend on row order within a show.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{Episode, Movie, Season, TVShow};

/// Errors raised while assembling the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An episode row references a show that was never fetched. This means
    /// the source snapshot is internally inconsistent; ingestion stops
    /// rather than dropping the row.
    #[error("episode {episode_id} references unknown show {show_id}")]
    UnknownShow { episode_id: i64, show_id: i64 },
}

/// The read-only result of ingestion: all movies and fully built shows.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub movies: Vec<Movie>,
    pub shows: Vec<TVShow>,
}

impl Catalog {
    /// Total real episodes across all shows.
    pub fn episode_count(&self) -> usize {
        self.shows.iter().map(TVShow::episode_count).sum()
    }
}

/// Assembles the show tree from flat rows.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    movies: Vec<Movie>,
    shows: Vec<TVShow>,
    show_index: HashMap<i64, usize>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add fetched movies. Movies take no further assembly.
    pub fn add_movies(&mut self, movies: Vec<Movie>) {
        self.movies.extend(movies);
    }

    /// Add fetched shows (seasons still empty) and index them by id so
    /// episode placement can resolve its owner.
    pub fn add_shows(&mut self, shows: Vec<TVShow>) {
        for show in shows {
            self.show_index.insert(show.id, self.shows.len());
            self.shows.push(show);
        }
    }

    /// Place one episode into its show's season tree.
    ///
    /// Grows the show's season vector and the season's episode vector as
    /// needed, never truncating or reordering existing entries. Writing an
    /// index twice keeps the last write. Air dates fold into the show's
    /// `first_aired`/`last_aired` as a running min/max.
    pub fn place_episode(&mut self, show_id: i64, episode: Episode) -> Result<(), CatalogError> {
        let &slot = self
            .show_index
            .get(&show_id)
            .ok_or(CatalogError::UnknownShow {
                episode_id: episode.id,
                show_id,
            })?;
        let show = &mut self.shows[slot];

        while show.seasons.len() <= episode.season_number {
            show.seasons.push(Season::new(show.seasons.len()));
        }

        if let Some(aired) = episode.aired_at {
            show.first_aired = Some(match show.first_aired {
                Some(first) => first.min(aired),
                None => aired,
            });
            show.last_aired = Some(match show.last_aired {
                Some(last) => last.max(aired),
                None => aired,
            });
        }

        let season = &mut show.seasons[episode.season_number];
        if season.episodes.len() <= episode.episode_number {
            season.episodes.resize(episode.episode_number + 1, None);
        }

        let number = episode.episode_number;
        season.episodes[number] = Some(episode);
        Ok(())
    }

    /// Finish assembly and hand over the read-only catalog.
    pub fn finish(self) -> Catalog {
        Catalog {
            movies: self.movies,
            shows: self.shows,
        }
    }
}
