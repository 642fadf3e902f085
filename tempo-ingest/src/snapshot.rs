//! Canonical serialization, snapshot hashing, and change detection
//!
//! A playlist's snapshot is the SHA-256 of its canonical JSON serialization.
//! serde_json keeps object keys sorted, so two structurally-equal documents
//! produce the same bytes regardless of key order in the source file (the
//! `preserve_order` feature must stay off for stored hashes to remain
//! reproducible).

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use tracing::warn;

/// Canonical byte form of a source document, suitable for hashing
pub fn canonical_bytes(doc: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(doc).context("Failed to serialize document for hashing")
}

/// Lowercase hex SHA-256 of the document's canonical form
pub fn snapshot_hash(doc: &Value) -> Result<String> {
    let bytes = canonical_bytes(doc)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// Decide whether a playlist needs (re-)ingestion
///
/// Only an exact match against the stored snapshot suppresses ingestion.
/// An absent row or a failed lookup both mean "ingest": a detection failure
/// must never silently drop data.
pub async fn needs_ingest(pool: &SqlitePool, playlist_id: i64, snapshot: &str) -> bool {
    let stored: std::result::Result<Option<String>, sqlx::Error> =
        sqlx::query_scalar("SELECT snapshot FROM playlists WHERE id = ?")
            .bind(playlist_id)
            .fetch_optional(pool)
            .await;

    match stored {
        Ok(Some(stored)) => stored != snapshot,
        Ok(None) => true,
        Err(e) => {
            warn!(playlist_id, error = %e, "Snapshot lookup failed; assuming changed");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_common::db::init_memory_database;

    #[test]
    fn hash_ignores_key_order() {
        let a: Value =
            serde_json::from_str(r#"{"id":1,"name":"Mix","tracks":{"items":[]}}"#).unwrap();
        let b: Value =
            serde_json::from_str(r#"{"tracks":{"items":[]},"name":"Mix","id":1}"#).unwrap();

        assert_eq!(snapshot_hash(&a).unwrap(), snapshot_hash(&b).unwrap());
    }

    #[test]
    fn hash_tracks_content_changes() {
        let a: Value = serde_json::from_str(r#"{"id":1,"name":"Mix"}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"id":1,"name":"Mix2"}"#).unwrap();

        assert_ne!(snapshot_hash(&a).unwrap(), snapshot_hash(&b).unwrap());
    }

    #[tokio::test]
    async fn absent_playlist_needs_ingest() {
        let pool = init_memory_database().await.unwrap();

        assert!(needs_ingest(&pool, 1, "abc").await);
    }

    #[tokio::test]
    async fn matching_snapshot_suppresses_ingest() {
        let pool = init_memory_database().await.unwrap();

        sqlx::query("INSERT INTO playlists (id, name, owner, snapshot) VALUES (1, 'Mix', 'u1', 'abc')")
            .execute(&pool)
            .await
            .unwrap();

        assert!(!needs_ingest(&pool, 1, "abc").await);
        assert!(needs_ingest(&pool, 1, "different").await);
    }
}
