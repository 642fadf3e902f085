//! Integration tests for the ingestion pipeline
//!
//! Covers idempotency, change propagation, and batch-level atomicity
//! against a real on-disk database.

use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;

use tempo_ingest::{run_ingest, IngestOptions};

const TABLES: [&str; 7] = [
    "playlists",
    "artists",
    "albums",
    "tracks",
    "track_artists",
    "playlist_tracks",
    "audio_features",
];

fn track_item(track_id: i64, artist_ids: &[i64], album_id: i64) -> Value {
    let artists: Vec<_> = artist_ids
        .iter()
        .map(|a| json!({ "id": a, "name": format!("Artist {}", a) }))
        .collect();
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "added_by": "user_1",
        "track": {
            "id": track_id,
            "name": format!("Track {}", track_id),
            "duration_ms": 200_000,
            "explicit": false,
            "popularity": 50,
            "artists": artists,
            "album": {
                "id": album_id,
                "name": format!("Album {}", album_id),
                "release_date": "2020-03-01",
                "album_type": "album"
            }
        }
    })
}

fn playlist(id: i64, items: Vec<Value>) -> Value {
    json!({
        "id": id,
        "name": format!("Playlist {}", id),
        "owner": "user_1",
        "tracks": { "items": items }
    })
}

fn basic_playlists() -> Value {
    json!([playlist(
        1,
        vec![
            track_item(1, &[10], 100),
            track_item(2, &[10, 11], 100),
        ]
    )])
}

fn basic_features() -> Value {
    json!({
        "audio_features": [
            { "track_id": 1, "danceability": 0.5, "energy": 0.7,
              "key": 5, "mode": 1, "tempo": 120.0, "valence": 0.8 },
            { "track_id": 2, "danceability": 0.6, "energy": 0.5,
              "key": 2, "mode": 0, "tempo": 90.0, "valence": 0.4 }
        ]
    })
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

async fn open_pool(dir: &TempDir) -> SqlitePool {
    let db_path = dir.path().join("tempo.db");
    tempo_common::db::init_database(&db_path).await.unwrap()
}

async fn table_counts(pool: &SqlitePool) -> Vec<(&'static str, i64)> {
    let mut counts = Vec::new();
    for table in TABLES {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap();
        counts.push((table, count));
    }
    counts
}

#[tokio::test]
async fn second_run_on_unchanged_input_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let pool = open_pool(&dir).await;
    let from = write_json(&dir, "playlists.json", &basic_playlists());
    let features = write_json(&dir, "features.json", &basic_features());

    let first = run_ingest(&pool, &from, &features, IngestOptions::default())
        .await
        .unwrap();
    assert!(first.rows_written > 0);
    assert_eq!(first.playlists_ingested, 1);

    let after_first = table_counts(&pool).await;

    let second = run_ingest(&pool, &from, &features, IngestOptions::default())
        .await
        .unwrap();
    assert_eq!(second.rows_written, 0);
    assert_eq!(second.playlists_ingested, 0);
    assert_eq!(second.playlists_skipped, 1);

    assert_eq!(table_counts(&pool).await, after_first);
}

#[tokio::test]
async fn changed_playlist_is_reingested_with_only_new_rows() {
    let dir = TempDir::new().unwrap();
    let pool = open_pool(&dir).await;
    let from = write_json(&dir, "playlists.json", &basic_playlists());
    let features = write_json(&dir, "features.json", &basic_features());

    run_ingest(&pool, &from, &features, IngestOptions::default())
        .await
        .unwrap();

    let old_snapshot: String = sqlx::query_scalar("SELECT snapshot FROM playlists WHERE id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();

    // Add one track by the already-known artist
    let changed = json!([playlist(
        1,
        vec![
            track_item(1, &[10], 100),
            track_item(2, &[10, 11], 100),
            track_item(3, &[10], 100),
        ]
    )]);
    let from = write_json(&dir, "playlists_v2.json", &changed);

    let summary = run_ingest(&pool, &from, &features, IngestOptions::default())
        .await
        .unwrap();
    assert_eq!(summary.playlists_ingested, 1);

    // Only genuinely new rows were added: one track, one junction row, one
    // playlist entry, plus the replaced playlist row itself
    let counts = table_counts(&pool).await;
    assert!(counts.contains(&("tracks", 3)));
    assert!(counts.contains(&("artists", 2)));
    assert!(counts.contains(&("albums", 1)));
    assert!(counts.contains(&("playlist_tracks", 3)));
    assert!(counts.contains(&("playlists", 1)));

    // The snapshot followed the content
    let new_snapshot: String = sqlx::query_scalar("SELECT snapshot FROM playlists WHERE id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_ne!(new_snapshot, old_snapshot);

    // Existing rows were skipped, not rewritten
    let name: String = sqlx::query_scalar("SELECT name FROM tracks WHERE id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name, "Track 1");
}

#[tokio::test]
async fn playlist_positions_follow_source_order() {
    let dir = TempDir::new().unwrap();
    let pool = open_pool(&dir).await;

    // Track ids descending: positions must reflect source order regardless
    let playlists = json!([playlist(
        1,
        vec![
            track_item(30, &[10], 100),
            track_item(20, &[10], 100),
            track_item(10, &[10], 100),
        ]
    )]);
    let from = write_json(&dir, "playlists.json", &playlists);
    let features = write_json(&dir, "features.json", &json!({ "audio_features": [] }));

    run_ingest(&pool, &from, &features, IngestOptions::default())
        .await
        .unwrap();

    let rows: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT track_id, position FROM playlist_tracks WHERE playlist_id = 1 ORDER BY position",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(rows, vec![(30, 0), (20, 1), (10, 2)]);
}

#[tokio::test]
async fn failed_batch_is_rolled_back_whole_and_prior_batches_remain() {
    let dir = TempDir::new().unwrap();
    let pool = open_pool(&dir).await;

    // First run: five playlists, one committed batch
    let first_docs = Value::Array(
        (1..=5)
            .map(|id| playlist(id, vec![track_item(id * 10, &[10], 100)]))
            .collect(),
    );
    let from = write_json(&dir, "playlists.json", &first_docs);
    let features = write_json(&dir, "features.json", &json!({ "audio_features": [] }));

    run_ingest(&pool, &from, &features, IngestOptions::default())
        .await
        .unwrap();
    let after_first = table_counts(&pool).await;

    // Inject a constraint failure on the last document of the next batch
    sqlx::query(
        "CREATE TRIGGER abort_playlist_10 BEFORE INSERT ON playlists
         WHEN NEW.id = 10
         BEGIN SELECT RAISE(ABORT, 'injected failure'); END",
    )
    .execute(&pool)
    .await
    .unwrap();

    // Second run: five more playlists in one batch, the last one poisoned
    let second_docs = Value::Array(
        (6..=10)
            .map(|id| playlist(id, vec![track_item(id * 10, &[10], 100)]))
            .collect(),
    );
    let from = write_json(&dir, "playlists_v2.json", &second_docs);

    let result = run_ingest(&pool, &from, &features, IngestOptions::default()).await;
    assert!(result.is_err(), "poisoned batch must fail the run");

    // Nothing from the second batch was committed, including the four clean
    // documents; the first run's rows are intact
    assert_eq!(table_counts(&pool).await, after_first);
}

#[tokio::test]
async fn features_for_unknown_track_abort_the_features_pass() {
    let dir = TempDir::new().unwrap();
    let pool = open_pool(&dir).await;
    let from = write_json(&dir, "playlists.json", &basic_playlists());
    let features = write_json(
        &dir,
        "features.json",
        &json!({
            "audio_features": [
                { "track_id": 999, "danceability": 0.5, "energy": 0.7,
                  "key": 5, "mode": 1, "tempo": 120.0, "valence": 0.8 }
            ]
        }),
    );

    let result = run_ingest(&pool, &from, &features, IngestOptions::default()).await;

    assert!(result.is_err(), "dangling feature row must be fatal");

    // The playlist batches committed before the features pass failed
    let track_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(track_count, 2);
}

#[tokio::test]
async fn malformed_document_fails_before_any_write() {
    let dir = TempDir::new().unwrap();
    let pool = open_pool(&dir).await;

    // Track without an album
    let malformed = json!([{
        "id": 1,
        "name": "Playlist 1",
        "owner": "user_1",
        "tracks": { "items": [{
            "added_at": null,
            "added_by": null,
            "track": {
                "id": 1, "name": "Track 1", "duration_ms": 1000,
                "explicit": false, "popularity": 10,
                "artists": [{ "id": 10, "name": "Artist 10" }]
            }
        }] }
    }]);
    let from = write_json(&dir, "playlists.json", &malformed);
    let features = write_json(&dir, "features.json", &json!({ "audio_features": [] }));

    let result = run_ingest(&pool, &from, &features, IngestOptions::default()).await;

    assert!(result.is_err());
    for (table, count) in table_counts(&pool).await {
        assert_eq!(count, 0, "{} should be empty", table);
    }
}
