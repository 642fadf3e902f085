//! Playlist track listing filtered by audio features

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::Row;

use super::ApiError;
use crate::AppState;

/// Query parameters for the track listing
#[derive(Debug, Deserialize)]
pub struct TracksQuery {
    /// Minimum energy, 0.0 to 1.0
    #[serde(default)]
    pub energy_min: f64,
}

#[derive(Debug, Serialize)]
pub struct TrackEntry {
    pub id: i64,
    pub name: String,
    pub popularity: Option<i64>,
    pub energy: f64,
    pub artists: Vec<ArtistEntry>,
}

#[derive(Debug, Serialize)]
pub struct ArtistEntry {
    pub id: i64,
    pub name: String,
}

/// GET /playlists/:id/tracks?energy_min=0.6
///
/// Tracks of one playlist with energy at or above the threshold, most
/// energetic first. Tracks without an audio-features row are not listed.
pub async fn playlist_tracks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TracksQuery>,
) -> Result<Json<Vec<TrackEntry>>, ApiError> {
    let rows = sqlx::query(
        "SELECT t.id, t.name, t.popularity, af.energy,
                a.id AS artist_id, a.name AS artist_name
         FROM playlist_tracks pt
         JOIN tracks t ON pt.track_id = t.id
         JOIN audio_features af ON af.track_id = t.id
         JOIN track_artists ta ON ta.track_id = t.id
         JOIN artists a ON a.id = ta.artist_id
         WHERE pt.playlist_id = ? AND af.energy >= ?
         ORDER BY af.energy DESC, t.id ASC, a.id ASC",
    )
    .bind(id)
    .bind(query.energy_min)
    .fetch_all(&state.db)
    .await
    .map_err(|e| ApiError::Database(e.to_string()))?;

    // One row per (track, artist) pair; rows for a track are contiguous, so
    // fold them into one entry per track
    let mut tracks: Vec<TrackEntry> = Vec::new();
    for row in &rows {
        let track_id: i64 = row.get("id");
        let artist = ArtistEntry {
            id: row.get("artist_id"),
            name: row.get("artist_name"),
        };

        match tracks.last_mut() {
            Some(entry) if entry.id == track_id => entry.artists.push(artist),
            _ => tracks.push(TrackEntry {
                id: track_id,
                name: row.get("name"),
                popularity: row.get("popularity"),
                energy: row.get("energy"),
                artists: vec![artist],
            }),
        }
    }

    Ok(Json(tracks))
}
