//! Network persistence integration tests.
//!
//! Exercises the full save/load cycle on disk: first-run initialization,
//! round-trip fidelity, hash-gated no-op saves, backup rotation, and
//! recovery over a corrupted primary file.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use plexstation::{
    Content, Episode, MediaFile, Movie, Network, NetworkStore, SaveOutcome, StationSchedule,
    StoreError, TVStation,
};
use tempfile::TempDir;

fn station(name: &str) -> TVStation {
    let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut station = TVStation::new(name, StationSchedule::new(date));
    station.description = Some(format!("{} description", name));
    station.country = Some("US".to_string());
    station.tags = Some(vec!["retro".to_string(), "movies".to_string()]);
    station
}

#[tokio::test]
async fn test_load_missing_file_returns_empty_network() {
    let temp = TempDir::new().unwrap();
    let store = NetworkStore::new(temp.path(), "fresh");

    let network = store.load().await.unwrap();

    assert_eq!(network.name, "fresh");
    assert!(network.stations.is_empty());
    assert!(network.last_save_hash.is_none());
}

#[tokio::test]
async fn test_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = NetworkStore::new(temp.path(), "testnet");

    let mut network = Network::new("testnet");
    network.stations.push(station("Channel One"));
    network.stations.push(station("Channel Two"));

    assert_eq!(store.save(&mut network).await.unwrap(), SaveOutcome::Written);

    let restored = store.load().await.unwrap();
    assert_eq!(restored.stations, network.stations);
    assert_eq!(restored.last_save_hash, network.last_save_hash);
}

#[tokio::test]
async fn test_round_trip_preserves_scheduled_programs() {
    let temp = TempDir::new().unwrap();
    let store = NetworkStore::new(temp.path(), "testnet");

    let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let mut schedule = StationSchedule::new(date);
    schedule.add_program(
        Content::Episode(Episode {
            id: 42,
            title: "Pilot".to_string(),
            summary: Some("First broadcast".to_string()),
            aired_at: Some(Utc.with_ymd_and_hms(2002, 7, 19, 0, 0, 0).unwrap()),
            media: MediaFile {
                id: 42,
                file: "/data/plex/tv/pilot.mkv".to_string(),
                duration: Duration::from_millis(1_800_123),
            },
            season_number: 0,
            episode_number: 0,
        }),
        date + chrono::Duration::hours(20),
    );
    schedule.add_program(
        Content::Movie(Movie {
            id: 7,
            title: "Heat".to_string(),
            summary: None,
            tagline: Some("A Los Angeles crime saga".to_string()),
            genres: vec!["Action".to_string(), "Crime".to_string()],
            released_at: Some(Utc.with_ymd_and_hms(1995, 12, 15, 0, 0, 0).unwrap()),
            media: MediaFile {
                id: 700,
                file: "/data/plex/movies/heat.mkv".to_string(),
                duration: Duration::from_millis(10_260_000),
            },
        }),
        date + chrono::Duration::hours(21),
    );

    let mut network = Network::new("testnet");
    network
        .stations
        .push(TVStation::new("Late Night", schedule));

    assert_eq!(store.save(&mut network).await.unwrap(), SaveOutcome::Written);

    // The full object graph survives: tagged content variants, embedded
    // media durations, optional fields and every timestamp
    let restored = store.load().await.unwrap();
    assert_eq!(restored.stations, network.stations);

    let programs = &restored.stations[0].schedule.programs;
    assert_eq!(programs.len(), 2);
    assert_eq!(
        programs[0].end_time - programs[0].start_time,
        chrono::Duration::milliseconds(1_800_123)
    );
    match &programs[0].content {
        Content::Episode(episode) => {
            assert_eq!(episode.media.duration, Duration::from_millis(1_800_123));
            assert_eq!(
                episode.aired_at,
                Some(Utc.with_ymd_and_hms(2002, 7, 19, 0, 0, 0).unwrap())
            );
        }
        other => panic!("expected an episode, got {:?}", other),
    }
    match &programs[1].content {
        Content::Movie(movie) => {
            assert_eq!(movie.genres, vec!["Action", "Crime"]);
            assert_eq!(movie.tagline.as_deref(), Some("A Los Angeles crime saga"));
        }
        other => panic!("expected a movie, got {:?}", other),
    }
}

#[tokio::test]
async fn test_immediate_save_after_load_is_noop() {
    let temp = TempDir::new().unwrap();
    let store = NetworkStore::new(temp.path(), "testnet");

    let mut network = Network::new("testnet");
    network.stations.push(station("Channel One"));
    store.save(&mut network).await.unwrap();

    let mut restored = store.load().await.unwrap();
    assert_eq!(
        store.save(&mut restored).await.unwrap(),
        SaveOutcome::Unchanged
    );
}

#[tokio::test]
async fn test_consecutive_saves_write_once() {
    let temp = TempDir::new().unwrap();
    let store = NetworkStore::new(temp.path(), "testnet");
    let backup_path = temp.path().join("network.db.bak");

    let mut network = Network::new("testnet");
    network.stations.push(station("Channel One"));

    assert_eq!(store.save(&mut network).await.unwrap(), SaveOutcome::Written);
    assert_eq!(
        store.save(&mut network).await.unwrap(),
        SaveOutcome::Unchanged
    );

    // A second write would have rotated the primary into a backup
    assert!(!backup_path.exists());
}

#[tokio::test]
async fn test_backup_holds_previous_generation() {
    let temp = TempDir::new().unwrap();
    let store = NetworkStore::new(temp.path(), "testnet");

    let mut network = Network::new("testnet");
    network.stations.push(station("Channel One"));
    store.save(&mut network).await.unwrap();
    let first_generation = network.stations.clone();

    network.stations.push(station("Channel Two"));
    assert_eq!(store.save(&mut network).await.unwrap(), SaveOutcome::Written);

    let backup_bytes = std::fs::read(temp.path().join("network.db.bak")).unwrap();
    let backed_up: Vec<TVStation> = serde_json::from_slice(&backup_bytes).unwrap();
    assert_eq!(backed_up, first_generation);

    // No stray temp file left behind
    assert!(!temp.path().join("network.db.tmp").exists());
}

#[tokio::test]
async fn test_corrupt_file_fails_load() {
    let temp = TempDir::new().unwrap();
    let store = NetworkStore::new(temp.path(), "testnet");

    std::fs::write(temp.path().join("network.db"), b"not a station list").unwrap();

    let err = store.load().await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[tokio::test]
async fn test_non_sequence_json_fails_load() {
    let temp = TempDir::new().unwrap();
    let store = NetworkStore::new(temp.path(), "testnet");

    // Valid JSON, wrong shape
    std::fs::write(temp.path().join("network.db"), br#"{"name": "nope"}"#).unwrap();

    let err = store.load().await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt(_)));
}

#[tokio::test]
async fn test_save_over_corrupt_primary_rotates_corrupt_bytes() {
    let temp = TempDir::new().unwrap();
    let store = NetworkStore::new(temp.path(), "testnet");

    let corrupt_bytes = b"garbage from a torn write".to_vec();
    std::fs::write(temp.path().join("network.db"), &corrupt_bytes).unwrap();

    let mut network = Network::new("testnet");
    network.stations.push(station("Channel One"));

    assert_eq!(store.save(&mut network).await.unwrap(), SaveOutcome::Written);

    // The corrupt bytes moved aside, the new primary is valid
    let backup = std::fs::read(temp.path().join("network.db.bak")).unwrap();
    assert_eq!(backup, corrupt_bytes);

    let restored = store.load().await.unwrap();
    assert_eq!(restored.stations, network.stations);
}
