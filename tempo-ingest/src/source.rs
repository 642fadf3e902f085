//! Source document parsing
//!
//! Source JSON is deserialized into a validated intermediate representation
//! before normalization runs, so a malformed document (for example a track
//! without an album) fails fast with a precise error instead of leaking
//! incomplete values into the record collections.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

use crate::snapshot;

/// One playlist document together with its canonical content hash
#[derive(Debug, Clone)]
pub struct SourcePlaylist {
    pub doc: PlaylistDocument,
    pub snapshot: String,
}

/// A playlist as delivered by the source: identity plus an ordered track list
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistDocument {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    pub items: Vec<PlaylistItem>,
}

/// One entry of the playlist track list
///
/// The wrapped track may be null or missing (removed from the catalog);
/// such entries are skipped by normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub added_at: Option<String>,
    pub added_by: Option<String>,
    pub track: Option<TrackObject>,
}

/// The album is required: a track without one is a malformed document.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    pub id: i64,
    pub name: String,
    pub duration_ms: i64,
    pub explicit: bool,
    pub popularity: Option<i64>,
    pub artists: Vec<ArtistRef>,
    pub album: AlbumRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumRef {
    pub id: i64,
    pub name: String,
    pub release_date: Option<String>,
    pub album_type: Option<String>,
}

/// The audio-features document: a flat list of per-track descriptor records
#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesDocument {
    pub audio_features: Vec<AudioFeatureObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeatureObject {
    pub track_id: i64,
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub mode: i64,
    pub tempo: f64,
    pub valence: f64,
}

/// Load a playlist file (a JSON array of playlist documents)
///
/// Each document is hashed in its raw form before validation, so the stored
/// snapshot reflects the source content exactly as delivered.
pub fn load_playlists(path: &Path) -> Result<Vec<SourcePlaylist>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read playlist file {}", path.display()))?;

    let raw: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("Playlist file {} is not a JSON array", path.display()))?;

    let mut playlists = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        let snapshot = snapshot::snapshot_hash(&value)?;
        let doc: PlaylistDocument = serde_json::from_value(value)
            .with_context(|| format!("Malformed playlist document at index {}", index))?;
        playlists.push(SourcePlaylist { doc, snapshot });
    }

    Ok(playlists)
}

/// Load the audio-features file
pub fn load_audio_features(path: &Path) -> Result<AudioFeaturesDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read audio features file {}", path.display()))?;

    serde_json::from_str(&text)
        .with_context(|| format!("Malformed audio features file {}", path.display()))
}
