//! Stations and the network that owns them.

use serde::{Deserialize, Serialize};

use super::schedule::StationSchedule;

/// A named virtual channel holding one schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TVStation {
    pub name: String,
    pub description: Option<String>,
    pub schedule: StationSchedule,
    pub country: Option<String>,
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
    pub active: bool,

    /// IANA timezone name the station broadcasts in
    pub timezone: String,
}

impl TVStation {
    /// Create an active station with an empty profile and UTC timezone.
    pub fn new(name: impl Into<String>, schedule: StationSchedule) -> Self {
        Self {
            name: name.into(),
            description: None,
            schedule,
            country: None,
            language: None,
            tags: None,
            active: true,
            timezone: "UTC".to_string(),
        }
    }
}

/// The full set of stations plus persistence bookkeeping.
///
/// `last_save_hash` is derived state owned by the store: the SHA-256 of the
/// serialized station sequence as last read from or written to disk. It is
/// never serialized itself.
#[derive(Debug, Clone)]
pub struct Network {
    pub name: String,
    pub stations: Vec<TVStation>,
    pub last_save_hash: Option<String>,
}

impl Network {
    /// Create an empty network with no persisted generation behind it.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stations: Vec::new(),
            last_save_hash: None,
        }
    }
}
