//! tempo-ingest - playlist ingestion pipeline
//!
//! Ingests externally-sourced playlist and audio-feature JSON documents into
//! the normalized tempo store:
//!
//! - [`source`] parses documents into a validated intermediate representation
//! - [`snapshot`] computes canonical content hashes and detects changes
//! - [`normalize`] flattens one document into deduplicated record collections
//! - [`batch`] partitions documents to bound per-transaction work
//! - [`upsert`] writes record collections with conflict-tolerant inserts
//! - [`pipeline`] wires the above into one run with batch-level atomicity

pub mod batch;
pub mod normalize;
pub mod pipeline;
pub mod records;
pub mod snapshot;
pub mod source;
pub mod upsert;

pub use pipeline::{run_ingest, IngestOptions, IngestSummary};
