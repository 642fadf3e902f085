//! Database initialization and schema creation
//!
//! Creates the seven relations populated by the ingestion pipeline. All
//! identifiers are source-provided; no surrogate keys are generated here.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Initialize database connection pool and create tables if needed
///
/// Foreign keys are enforced on every pooled connection; WAL allows readers
/// while the ingest writer holds the write lock.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_tables(&pool).await?;

    Ok(pool)
}

/// Connect to an existing database in read-only mode
///
/// Used by the query API, which never writes.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(crate::Error::NotFound(format!(
            "Database not found: {} (run tempo-ingest first)",
            db_path.display()
        )));
    }

    let options = SqliteConnectOptions::new().filename(db_path).read_only(true);
    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// In-memory database with the full schema, for tests
///
/// Capped at one connection: each SQLite in-memory connection is its own
/// database, so a larger pool would hand out empty databases.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .in_memory(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent, safe to call repeatedly)
///
/// Creation order follows foreign-key dependencies: artists and albums before
/// tracks; tracks before track_artists and audio_features; playlists before
/// playlist_tracks.
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_artists_table(pool).await?;
    create_albums_table(pool).await?;
    create_tracks_table(pool).await?;
    create_track_artists_table(pool).await?;
    create_playlists_table(pool).await?;
    create_playlist_tracks_table(pool).await?;
    create_audio_features_table(pool).await?;

    info!("Database tables initialized");

    Ok(())
}

pub async fn create_playlists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlists (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            owner TEXT NOT NULL,
            snapshot TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artists (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            popularity INTEGER,
            followers INTEGER,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create_albums_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS albums (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            release_date TEXT,
            album_type TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            duration_ms INTEGER NOT NULL,
            explicit INTEGER NOT NULL,
            popularity INTEGER,
            album_id INTEGER NOT NULL REFERENCES albums(id),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create_track_artists_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS track_artists (
            track_id INTEGER NOT NULL REFERENCES tracks(id),
            artist_id INTEGER NOT NULL REFERENCES artists(id),
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (track_id, artist_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create_playlist_tracks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playlist_tracks (
            playlist_id INTEGER NOT NULL REFERENCES playlists(id),
            track_id INTEGER NOT NULL REFERENCES tracks(id),
            added_at TEXT,
            added_by TEXT,
            position INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (playlist_id, track_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn create_audio_features_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS audio_features (
            track_id INTEGER PRIMARY KEY REFERENCES tracks(id),
            danceability REAL NOT NULL,
            energy REAL NOT NULL,
            key INTEGER NOT NULL,
            mode INTEGER NOT NULL,
            tempo REAL NOT NULL,
            valence REAL NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_tables_idempotent() {
        let pool = init_memory_database()
            .await
            .expect("Failed to create in-memory database");

        create_tables(&pool).await.expect("Second creation failed");

        // All seven tables should exist
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN
             ('playlists', 'artists', 'albums', 'tracks', 'track_artists',
              'playlist_tracks', 'audio_features')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 7);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = init_memory_database()
            .await
            .expect("Failed to create in-memory database");

        // A track referencing a missing album must be rejected
        let result = sqlx::query(
            "INSERT INTO tracks (id, name, duration_ms, explicit, popularity, album_id)
             VALUES (1, 'Orphan', 1000, 0, 50, 999)",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "Foreign key violation should be rejected");
    }
}
