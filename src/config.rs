//! Runtime configuration and directory layout.
//!
//! All state lives under one working directory (default `~/.plexstation`)
//! with three subdirectories: `conf/` for persisted state such as the
//! network file, `bin/` for helper binaries, `tmp/` for scratch files.
//!
//! The Plex database path can be given explicitly or discovered at the
//! platform's default install location.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;

/// Resolved configuration for one process run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding all subdirectories
    pub env_dir: PathBuf,
    /// Persisted state (network file)
    pub conf_dir: PathBuf,
    /// Helper binaries
    pub bin_dir: PathBuf,
    /// Scratch space
    pub tmp_dir: PathBuf,

    /// Network name used when initializing a fresh network
    pub network: String,

    /// Plex database path, if one was given or discovered
    pub plex_db: Option<PathBuf>,

    /// Optional `(prefix, replacement)` rewrite for media file paths
    pub path_translate: Option<(String, String)>,
}

impl Config {
    /// Build a config rooted at `directory` (`~` expands to the home dir).
    pub fn new(
        directory: &str,
        network: impl Into<String>,
        plex_db: Option<PathBuf>,
        path_translate: Option<(String, String)>,
    ) -> Self {
        let env_dir = expand_home(directory);
        Self {
            conf_dir: env_dir.join("conf"),
            bin_dir: env_dir.join("bin"),
            tmp_dir: env_dir.join("tmp"),
            env_dir,
            network: network.into(),
            plex_db: plex_db.or_else(default_plex_db_path),
            path_translate,
        }
    }

    /// Create the working directory tree.
    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.env_dir, &self.conf_dir, &self.bin_dir, &self.tmp_dir] {
            debug!("creating directory {}", dir.display());
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// The Plex database path, required for ingestion commands.
    pub fn require_plex_db(&self) -> Result<&Path> {
        self.plex_db
            .as_deref()
            .context("No Plex database found; pass --plex-db or set PLEX_DB")
    }
}

/// Parse a `'/mnt/plex -> /data/plex'` path-translation argument.
pub fn parse_path_translation(raw: &str) -> Result<(String, String), String> {
    let err = || {
        format!(
            "'{}' is not a valid path translation. Must be in the form '/mnt/plex -> /data/plex'.",
            raw
        )
    };

    let (prefix, replacement) = raw.split_once("->").ok_or_else(err)?;
    let prefix = prefix.trim();
    let replacement = replacement.trim();
    if prefix.is_empty() || replacement.is_empty() {
        return Err(err());
    }

    Ok((prefix.to_string(), replacement.to_string()))
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Default Plex database location for the current platform, if a file
/// exists there. Falls back to a database in the current directory.
pub fn default_plex_db_path() -> Option<PathBuf> {
    const DB_NAME: &str = "com.plexapp.plugins.library.db";

    let platform_default: Option<PathBuf> = if cfg!(target_os = "linux") {
        Some(PathBuf::from(
            "/var/lib/plexmediaserver/Library/Application Support/Plex Media Server/Plug-in Support/Databases",
        ).join(DB_NAME))
    } else if cfg!(target_os = "macos") {
        dirs::home_dir().map(|home| {
            home.join("Library/Application Support/Plex Media Server/Plug-in Support/Databases")
                .join(DB_NAME)
        })
    } else if cfg!(target_os = "windows") {
        std::env::var_os("LOCALAPPDATA").map(|base| {
            PathBuf::from(base)
                .join("Plex Media Server")
                .join("Plug-in Support")
                .join("Databases")
                .join(DB_NAME)
        })
    } else {
        None
    };

    [platform_default, Some(PathBuf::from(DB_NAME))]
        .into_iter()
        .flatten()
        .find(|candidate| candidate.is_file())
}
