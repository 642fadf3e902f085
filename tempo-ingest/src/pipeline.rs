//! Ingestion run orchestration
//!
//! One run: load both documents, drop unchanged playlists, process the
//! remainder in batches (one transaction per batch), then upsert audio
//! features after every playlist batch has committed. A failure inside a
//! batch rolls that whole batch back and aborts the run; batches committed
//! earlier stay in place.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, error, info};

use crate::batch::batches;
use crate::normalize::{self, RecordSet};
use crate::snapshot;
use crate::source::{self, SourcePlaylist};
use crate::upsert;

pub const DEFAULT_BATCH_SIZE: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Number of playlist documents per transaction
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Per-run outcome, reported on success and on the failure path alike
#[derive(Debug, Default)]
pub struct IngestSummary {
    /// Rows actually written across all relations
    pub rows_written: u64,
    /// Playlists whose content hash changed (or was unknown)
    pub playlists_ingested: usize,
    /// Playlists skipped because their stored snapshot matched
    pub playlists_skipped: usize,
}

/// Run the full ingestion pipeline against `pool`
pub async fn run_ingest(
    pool: &SqlitePool,
    playlists_path: &Path,
    features_path: &Path,
    options: IngestOptions,
) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();
    let result = run_inner(pool, playlists_path, features_path, options, &mut summary).await;

    // The written-rows total is part of the audit trail on every exit path
    match &result {
        Ok(()) => info!(
            rows_written = summary.rows_written,
            playlists_ingested = summary.playlists_ingested,
            playlists_skipped = summary.playlists_skipped,
            "Ingestion complete"
        ),
        Err(_) => error!(
            rows_written = summary.rows_written,
            "Ingestion aborted; rows from already-committed batches remain"
        ),
    }

    result.map(|()| summary)
}

async fn run_inner(
    pool: &SqlitePool,
    playlists_path: &Path,
    features_path: &Path,
    options: IngestOptions,
    summary: &mut IngestSummary,
) -> Result<()> {
    let playlists = source::load_playlists(playlists_path)?;
    let features = source::load_audio_features(features_path)?;

    // Change detection: only documents whose snapshot differs survive
    let mut to_ingest: Vec<SourcePlaylist> = Vec::new();
    for playlist in playlists {
        if snapshot::needs_ingest(pool, playlist.doc.id, &playlist.snapshot).await {
            to_ingest.push(playlist);
        } else {
            debug!(playlist_id = playlist.doc.id, "Playlist unchanged; skipping");
            summary.playlists_skipped += 1;
        }
    }
    summary.playlists_ingested = to_ingest.len();

    if to_ingest.is_empty() {
        info!("All playlists already ingested and unchanged");
    }

    for batch in batches(&to_ingest, options.batch_size) {
        let mut records = RecordSet::default();
        for playlist in batch {
            records.append(normalize::normalize_playlist(playlist));
        }

        let written = commit_record_set(pool, &records).await?;
        summary.rows_written += written;
        info!(
            playlists = batch.len(),
            rows_written = written,
            "Committed batch"
        );
    }

    // Audio features land only after every playlist batch has committed; a
    // run that fails earlier leaves tracks without features, which is an
    // accepted intermediate state.
    let feature_records = normalize::normalize_audio_features(&features);
    summary.rows_written += commit_record_set(pool, &feature_records).await?;

    Ok(())
}

/// One batch, one transaction
///
/// Commits when every insert succeeds; any failure drops the transaction,
/// which rolls back and returns the connection to the pool.
async fn commit_record_set(pool: &SqlitePool, records: &RecordSet) -> Result<u64> {
    if records.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await.context("Failed to begin transaction")?;
    let written = upsert::upsert_record_set(&mut tx, records).await?;
    tx.commit().await.context("Failed to commit transaction")?;

    Ok(written)
}
