//! Normalization of nested source documents into flat record collections
//!
//! Artists and albums are deduplicated by id within the current document
//! only; cross-document deduplication is the storage layer's conflict
//! handling. The dedup maps are keyed by the source id and drained in key
//! order, so a document always normalizes to the same sequence of records.

use std::collections::BTreeMap;

use crate::records::{
    AlbumRecord, ArtistRecord, AudioFeatureRecord, PlaylistRecord, PlaylistTrackRecord,
    TrackArtistRecord, TrackRecord,
};
use crate::source::{AudioFeaturesDocument, SourcePlaylist};

/// The record collections produced by normalizing source documents
#[derive(Debug, Default)]
pub struct RecordSet {
    pub playlists: Vec<PlaylistRecord>,
    pub artists: Vec<ArtistRecord>,
    pub albums: Vec<AlbumRecord>,
    pub tracks: Vec<TrackRecord>,
    pub track_artists: Vec<TrackArtistRecord>,
    pub playlist_tracks: Vec<PlaylistTrackRecord>,
    pub audio_features: Vec<AudioFeatureRecord>,
}

impl RecordSet {
    /// Move every record of `other` into `self`, preserving order
    pub fn append(&mut self, mut other: RecordSet) {
        self.playlists.append(&mut other.playlists);
        self.artists.append(&mut other.artists);
        self.albums.append(&mut other.albums);
        self.tracks.append(&mut other.tracks);
        self.track_artists.append(&mut other.track_artists);
        self.playlist_tracks.append(&mut other.playlist_tracks);
        self.audio_features.append(&mut other.audio_features);
    }

    /// Total record count across all collections
    pub fn len(&self) -> usize {
        self.playlists.len()
            + self.artists.len()
            + self.albums.len()
            + self.tracks.len()
            + self.track_artists.len()
            + self.playlist_tracks.len()
            + self.audio_features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flatten one playlist document into its record collections
///
/// Null track entries are skipped without error. The position of each
/// playlist-track row is the item's ordinal index in the source list (a
/// skipped null entry still consumes its index), never a value from the
/// payload.
pub fn normalize_playlist(src: &SourcePlaylist) -> RecordSet {
    let doc = &src.doc;
    let mut artists: BTreeMap<i64, ArtistRecord> = BTreeMap::new();
    let mut albums: BTreeMap<i64, AlbumRecord> = BTreeMap::new();
    let mut out = RecordSet::default();

    for (position, item) in doc.tracks.items.iter().enumerate() {
        let Some(track) = &item.track else {
            continue;
        };

        for artist in &track.artists {
            artists.entry(artist.id).or_insert_with(|| ArtistRecord {
                id: artist.id,
                name: artist.name.clone(),
                // Popularity and followers are not present in playlist
                // documents; they stay unset until a richer source fills them.
                popularity: None,
                followers: None,
            });
        }

        albums.entry(track.album.id).or_insert_with(|| AlbumRecord {
            id: track.album.id,
            name: track.album.name.clone(),
            release_date: track.album.release_date.clone(),
            album_type: track.album.album_type.clone(),
        });

        out.tracks.push(TrackRecord {
            id: track.id,
            name: track.name.clone(),
            duration_ms: track.duration_ms,
            explicit: track.explicit,
            popularity: track.popularity,
            album_id: track.album.id,
        });

        for artist in &track.artists {
            out.track_artists.push(TrackArtistRecord {
                track_id: track.id,
                artist_id: artist.id,
            });
        }

        out.playlist_tracks.push(PlaylistTrackRecord {
            playlist_id: doc.id,
            track_id: track.id,
            added_at: item.added_at.clone(),
            added_by: item.added_by.clone(),
            position: position as i64,
        });
    }

    out.playlists.push(PlaylistRecord {
        id: doc.id,
        name: doc.name.clone(),
        owner: doc.owner.clone(),
        snapshot: src.snapshot.clone(),
    });
    out.artists = artists.into_values().collect();
    out.albums = albums.into_values().collect();

    out
}

/// Flatten the audio-features document
///
/// Records are produced only for tracks present in the document; tracks
/// without a matching descriptor are simply absent from the collection.
pub fn normalize_audio_features(doc: &AudioFeaturesDocument) -> RecordSet {
    let mut out = RecordSet::default();

    for features in &doc.audio_features {
        out.audio_features.push(AudioFeatureRecord {
            track_id: features.track_id,
            danceability: features.danceability,
            energy: features.energy,
            key: features.key,
            mode: features.mode,
            tempo: features.tempo,
            valence: features.valence,
        });
    }

    out
}
