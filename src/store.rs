//! Durable persistence for the station network.
//!
//! The primary file is only ever replaced by whole-file renames: a save
//! writes the new generation to a temporary file next to the primary,
//! rotates the previous generation to `.bak`, then renames the temporary
//! file into place. At every observable instant the primary path holds
//! either the complete previous generation or the complete new one. A
//! SHA-256 content hash gates the whole procedure, so a save with no
//! changes performs zero I/O and keeps the existing backup intact.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

use crate::domain::{Network, TVStation};

/// Primary file name inside the config directory.
pub const NETWORK_FILE: &str = "network.db";

/// Errors raised while loading or saving the network.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but does not deserialize to a station sequence.
    /// Restore from the `.bak` copy or delete the file to reinitialize.
    #[error("invalid network file: {0}")]
    Corrupt(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of a save call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new generation was written and the backup rotated.
    Written,

    /// The station sequence hashed identically to the last persisted
    /// generation; nothing was touched.
    Unchanged,
}

/// Loads and saves the station network in a config directory.
pub struct NetworkStore {
    conf_dir: PathBuf,
    network_name: String,
}

impl NetworkStore {
    pub fn new(conf_dir: impl Into<PathBuf>, network_name: impl Into<String>) -> Self {
        Self {
            conf_dir: conf_dir.into(),
            network_name: network_name.into(),
        }
    }

    /// Path of the primary network file.
    pub fn network_path(&self) -> PathBuf {
        self.conf_dir.join(NETWORK_FILE)
    }

    /// Load the network, or initialize a fresh one if no file exists yet.
    ///
    /// A missing file is first-run initialization, not an error. An
    /// existing file that does not parse as a station sequence is
    /// [`StoreError::Corrupt`].
    pub async fn load(&self) -> Result<Network, StoreError> {
        let path = self.network_path();
        debug!("loading network from {}", path.display());

        if !fs::try_exists(&path).await? {
            warn!(
                "network file not found: {} - initializing new network",
                path.display()
            );
            return Ok(Network::new(self.network_name.clone()));
        }

        let bytes = fs::read(&path).await?;
        let stations: Vec<TVStation> =
            serde_json::from_slice(&bytes).map_err(|_| StoreError::Corrupt(path.clone()))?;

        // Hashing the exact bytes read guarantees an immediate no-op save
        // is a no-write.
        Ok(Network {
            name: self.network_name.clone(),
            stations,
            last_save_hash: Some(content_hash(&bytes)),
        })
    }

    /// Persist the network's stations if they changed since the last
    /// load or save.
    pub async fn save(&self, network: &mut Network) -> Result<SaveOutcome, StoreError> {
        let bytes = serde_json::to_vec(&network.stations)?;
        let hash = content_hash(&bytes);

        if network.last_save_hash.as_deref() == Some(hash.as_str()) {
            debug!("no changes to network, skipping save");
            return Ok(SaveOutcome::Unchanged);
        }

        let path = self.network_path();
        let tmp_path = sibling(&path, "tmp");
        let backup_path = sibling(&path, "bak");

        debug!("saving network to {}", path.display());
        fs::write(&tmp_path, &bytes).await?;

        if fs::try_exists(&path).await? {
            debug!(
                "backing up existing stations file to {}",
                backup_path.display()
            );
            fs::rename(&path, &backup_path).await?;
        }
        fs::rename(&tmp_path, &path).await?;

        network.last_save_hash = Some(hash);
        Ok(SaveOutcome::Written)
    }
}

/// `path` with an extra dotted suffix appended (network.db -> network.db.bak).
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
