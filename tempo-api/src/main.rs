//! tempo-api - read-only query service over the tempo store
//!
//! Serves aggregate queries against the relations populated by
//! tempo-ingest. Never writes; the database is opened read-only.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use tempo_api::{build_router, AppState};

/// Command-line arguments for tempo-api
#[derive(Parser, Debug)]
#[command(name = "tempo-api")]
#[command(about = "Read-only query API for the tempo store")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "TEMPO_API_PORT")]
    port: u16,

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

    info!("Starting tempo-api v{}", env!("CARGO_PKG_VERSION"));

    let db_path = tempo_common::config::resolve_database_path(args.database.as_deref())?;
    info!("Database path: {}", db_path.display());

    let pool = tempo_common::db::connect_readonly(&db_path).await?;
    info!("Connected to database (read-only)");

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("tempo-api listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
