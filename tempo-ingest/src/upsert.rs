//! Conflict-tolerant multi-row inserts
//!
//! One statement per record collection. A duplicate unique key is resolved
//! by the record's conflict clause (skip, except playlists); any other
//! constraint violation surfaces as an error and aborts the caller's
//! transaction.

use anyhow::{Context, Result};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;

use crate::normalize::RecordSet;
use crate::records::BulkRecord;

/// Write one record collection with a single multi-row INSERT
///
/// An empty collection is a no-op: no statement is issued and zero rows are
/// reported. Returns the count of rows actually written, which is less than
/// the collection size when existing keys were skipped.
pub async fn insert_all<R: BulkRecord>(conn: &mut SqliteConnection, rows: &[R]) -> Result<u64> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        R::TABLE,
        R::COLUMNS.join(", ")
    ));
    qb.push_values(rows, |mut row, record| record.push_tuple(&mut row));
    qb.push(" ");
    qb.push(R::CONFLICT_CLAUSE);

    let written = qb
        .build()
        .execute(&mut *conn)
        .await
        .with_context(|| format!("Failed to insert into {}", R::TABLE))?
        .rows_affected();

    if written > 0 {
        debug!(table = R::TABLE, rows = written, "Wrote rows");
    }

    Ok(written)
}

/// Write a full record set in foreign-key dependency order
///
/// Artists and albums before tracks; tracks before track_artists and
/// audio_features; playlists before playlist_tracks. Returns the total rows
/// written across all relations.
pub async fn upsert_record_set(conn: &mut SqliteConnection, records: &RecordSet) -> Result<u64> {
    let mut written = 0;
    written += insert_all(&mut *conn, &records.artists).await?;
    written += insert_all(&mut *conn, &records.albums).await?;
    written += insert_all(&mut *conn, &records.tracks).await?;
    written += insert_all(&mut *conn, &records.track_artists).await?;
    written += insert_all(&mut *conn, &records.playlists).await?;
    written += insert_all(&mut *conn, &records.playlist_tracks).await?;
    written += insert_all(&mut *conn, &records.audio_features).await?;
    Ok(written)
}
