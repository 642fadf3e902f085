//! tempo-ingest - playlist ingestion pipeline
//!
//! Reads a playlist JSON file and an audio-features JSON file, skips
//! playlists whose content is unchanged, and writes everything else into the
//! tempo database in batched transactions.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use tempo_ingest::pipeline::DEFAULT_BATCH_SIZE;
use tempo_ingest::{run_ingest, IngestOptions};

/// Command-line arguments for tempo-ingest
#[derive(Parser, Debug)]
#[command(name = "tempo-ingest")]
#[command(about = "Ingest playlist and audio-feature documents into the tempo database")]
#[command(version)]
struct Args {
    /// Path to the playlist JSON file
    #[arg(short, long)]
    from: PathBuf,

    /// Path to the audio features JSON file
    #[arg(short = 'p', long)]
    features: PathBuf,

    /// Batch size for database inserts
    #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch: usize,

    /// Database file path (default: TEMPO_DB, config file, then OS data dir)
    #[arg(short, long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.batch >= 1, "batch size must be at least 1");

    info!("Starting tempo-ingest v{}", env!("CARGO_PKG_VERSION"));
    info!("Ingesting playlists from: {}", args.from.display());
    info!("With audio features from: {}", args.features.display());
    info!("Batch size: {}", args.batch);

    let db_path = tempo_common::config::resolve_database_path(args.database.as_deref())?;
    info!("Database: {}", db_path.display());

    let pool = tempo_common::db::init_database(&db_path).await?;

    let options = IngestOptions {
        batch_size: args.batch,
    };
    let summary = run_ingest(&pool, &args.from, &args.features, options).await?;

    info!("Total rows written: {}", summary.rows_written);
    pool.close().await;

    Ok(())
}
