//! Flat record types produced by normalization, and their relation bindings
//!
//! Every record type names its target relation, column list, and conflict
//! clause. Duplicate keys resolve as "do nothing" everywhere except
//! playlists: the snapshot column must follow content, so playlists are the
//! single relation whose rows are replaced on conflict.

use sqlx::query_builder::Separated;
use sqlx::Sqlite;

/// A record type writable with one multi-row INSERT
pub trait BulkRecord {
    /// Target relation name
    const TABLE: &'static str;
    /// Column list, in bind order
    const COLUMNS: &'static [&'static str];
    /// Conflict resolution appended to the statement
    const CONFLICT_CLAUSE: &'static str;

    /// Bind this record's values as one VALUES tuple
    fn push_tuple<'qb, 'args>(&'args self, row: &mut Separated<'qb, 'args, Sqlite, &'static str>);
}

#[derive(Debug, Clone)]
pub struct PlaylistRecord {
    pub id: i64,
    pub name: String,
    pub owner: String,
    pub snapshot: String,
}

impl BulkRecord for PlaylistRecord {
    const TABLE: &'static str = "playlists";
    const COLUMNS: &'static [&'static str] = &["id", "name", "owner", "snapshot"];
    const CONFLICT_CLAUSE: &'static str = "ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        owner = excluded.owner,
        snapshot = excluded.snapshot";

    fn push_tuple<'qb, 'args>(&'args self, row: &mut Separated<'qb, 'args, Sqlite, &'static str>) {
        row.push_bind(self.id);
        row.push_bind(&self.name);
        row.push_bind(&self.owner);
        row.push_bind(&self.snapshot);
    }
}

#[derive(Debug, Clone)]
pub struct ArtistRecord {
    pub id: i64,
    pub name: String,
    pub popularity: Option<i64>,
    pub followers: Option<i64>,
}

impl BulkRecord for ArtistRecord {
    const TABLE: &'static str = "artists";
    const COLUMNS: &'static [&'static str] = &["id", "name", "popularity", "followers"];
    const CONFLICT_CLAUSE: &'static str = "ON CONFLICT(id) DO NOTHING";

    fn push_tuple<'qb, 'args>(&'args self, row: &mut Separated<'qb, 'args, Sqlite, &'static str>) {
        row.push_bind(self.id);
        row.push_bind(&self.name);
        row.push_bind(self.popularity);
        row.push_bind(self.followers);
    }
}

#[derive(Debug, Clone)]
pub struct AlbumRecord {
    pub id: i64,
    pub name: String,
    pub release_date: Option<String>,
    pub album_type: Option<String>,
}

impl BulkRecord for AlbumRecord {
    const TABLE: &'static str = "albums";
    const COLUMNS: &'static [&'static str] = &["id", "name", "release_date", "album_type"];
    const CONFLICT_CLAUSE: &'static str = "ON CONFLICT(id) DO NOTHING";

    fn push_tuple<'qb, 'args>(&'args self, row: &mut Separated<'qb, 'args, Sqlite, &'static str>) {
        row.push_bind(self.id);
        row.push_bind(&self.name);
        row.push_bind(self.release_date.as_deref());
        row.push_bind(self.album_type.as_deref());
    }
}

#[derive(Debug, Clone)]
pub struct TrackRecord {
    pub id: i64,
    pub name: String,
    pub duration_ms: i64,
    pub explicit: bool,
    pub popularity: Option<i64>,
    pub album_id: i64,
}

impl BulkRecord for TrackRecord {
    const TABLE: &'static str = "tracks";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "duration_ms",
        "explicit",
        "popularity",
        "album_id",
    ];
    const CONFLICT_CLAUSE: &'static str = "ON CONFLICT(id) DO NOTHING";

    fn push_tuple<'qb, 'args>(&'args self, row: &mut Separated<'qb, 'args, Sqlite, &'static str>) {
        row.push_bind(self.id);
        row.push_bind(&self.name);
        row.push_bind(self.duration_ms);
        row.push_bind(self.explicit);
        row.push_bind(self.popularity);
        row.push_bind(self.album_id);
    }
}

#[derive(Debug, Clone)]
pub struct TrackArtistRecord {
    pub track_id: i64,
    pub artist_id: i64,
}

impl BulkRecord for TrackArtistRecord {
    const TABLE: &'static str = "track_artists";
    const COLUMNS: &'static [&'static str] = &["track_id", "artist_id"];
    const CONFLICT_CLAUSE: &'static str = "ON CONFLICT(track_id, artist_id) DO NOTHING";

    fn push_tuple<'qb, 'args>(&'args self, row: &mut Separated<'qb, 'args, Sqlite, &'static str>) {
        row.push_bind(self.track_id);
        row.push_bind(self.artist_id);
    }
}

#[derive(Debug, Clone)]
pub struct PlaylistTrackRecord {
    pub playlist_id: i64,
    pub track_id: i64,
    pub added_at: Option<String>,
    pub added_by: Option<String>,
    pub position: i64,
}

impl BulkRecord for PlaylistTrackRecord {
    const TABLE: &'static str = "playlist_tracks";
    const COLUMNS: &'static [&'static str] = &[
        "playlist_id",
        "track_id",
        "added_at",
        "added_by",
        "position",
    ];
    const CONFLICT_CLAUSE: &'static str = "ON CONFLICT(playlist_id, track_id) DO NOTHING";

    fn push_tuple<'qb, 'args>(&'args self, row: &mut Separated<'qb, 'args, Sqlite, &'static str>) {
        row.push_bind(self.playlist_id);
        row.push_bind(self.track_id);
        row.push_bind(self.added_at.as_deref());
        row.push_bind(self.added_by.as_deref());
        row.push_bind(self.position);
    }
}

#[derive(Debug, Clone)]
pub struct AudioFeatureRecord {
    pub track_id: i64,
    pub danceability: f64,
    pub energy: f64,
    pub key: i64,
    pub mode: i64,
    pub tempo: f64,
    pub valence: f64,
}

impl BulkRecord for AudioFeatureRecord {
    const TABLE: &'static str = "audio_features";
    const COLUMNS: &'static [&'static str] = &[
        "track_id",
        "danceability",
        "energy",
        "key",
        "mode",
        "tempo",
        "valence",
    ];
    const CONFLICT_CLAUSE: &'static str = "ON CONFLICT(track_id) DO NOTHING";

    fn push_tuple<'qb, 'args>(&'args self, row: &mut Separated<'qb, 'args, Sqlite, &'static str>) {
        row.push_bind(self.track_id);
        row.push_bind(self.danceability);
        row.push_bind(self.energy);
        row.push_bind(self.key);
        row.push_bind(self.mode);
        row.push_bind(self.tempo);
        row.push_bind(self.valence);
    }
}
