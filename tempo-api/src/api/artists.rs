//! Artist summary endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use sqlx::Row;

use super::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ArtistSummary {
    pub artist: Artist,
    pub top_tracks: Vec<TopTrack>,
    pub averages: FeatureAverages,
}

#[derive(Debug, Serialize)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub popularity: Option<i64>,
    pub followers: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TopTrack {
    pub id: i64,
    pub name: String,
    pub popularity: Option<i64>,
}

/// Averages are null when none of the artist's tracks carry features yet
#[derive(Debug, Serialize)]
pub struct FeatureAverages {
    pub energy: Option<f64>,
    pub danceability: Option<f64>,
    pub valence: Option<f64>,
    pub tempo: Option<f64>,
}

/// GET /artists/:id/summary
///
/// The artist row, its five most popular tracks, and the average audio
/// features across all of its tracks.
pub async fn artist_summary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ArtistSummary>, ApiError> {
    let artist_row = sqlx::query("SELECT id, name, popularity, followers FROM artists WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| ApiError::Database(e.to_string()))?;

    let Some(artist_row) = artist_row else {
        return Err(ApiError::NotFound(format!("Artist {} not found", id)));
    };

    let artist = Artist {
        id: artist_row.get("id"),
        name: artist_row.get("name"),
        popularity: artist_row.get("popularity"),
        followers: artist_row.get("followers"),
    };

    let top_tracks = sqlx::query(
        "SELECT t.id, t.name, t.popularity
         FROM tracks t
         JOIN track_artists ta ON t.id = ta.track_id
         WHERE ta.artist_id = ?
         ORDER BY t.popularity DESC
         LIMIT 5",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await
    .map_err(|e| ApiError::Database(e.to_string()))?
    .iter()
    .map(|row| TopTrack {
        id: row.get("id"),
        name: row.get("name"),
        popularity: row.get("popularity"),
    })
    .collect();

    let avg_row = sqlx::query(
        "SELECT avg(af.energy) AS energy,
                avg(af.danceability) AS danceability,
                avg(af.valence) AS valence,
                avg(af.tempo) AS tempo
         FROM audio_features af
         JOIN track_artists ta ON af.track_id = ta.track_id
         WHERE ta.artist_id = ?",
    )
    .bind(id)
    .fetch_one(&state.db)
    .await
    .map_err(|e| ApiError::Database(e.to_string()))?;

    let averages = FeatureAverages {
        energy: avg_row.get("energy"),
        danceability: avg_row.get("danceability"),
        valence: avg_row.get("valence"),
        tempo: avg_row.get("tempo"),
    };

    Ok(Json(ArtistSummary {
        artist,
        top_tracks,
        averages,
    }))
}
