/// Collaborator contracts consumed by the playback engine
use crate::error::Result;
use crate::types::{Album, AlbumId, ArtistId, GenreId, Track, TrackId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Read access to the catalog, plus the popularity counter
///
/// Lookups never fail: a missing row is reported as `None` or an empty
/// sequence and callers substitute their own defaults. Implementations are
/// expected to answer from memory; the engine calls these on its dispatch
/// thread.
pub trait LibraryStore: Send + Sync {
    /// Track ids of an album, ordered by ascending track number
    fn track_ids_by_album(&self, album_id: AlbumId) -> Vec<TrackId>;

    /// Full track row
    fn track(&self, track_id: TrackId) -> Option<Track>;

    /// Full album row
    fn album(&self, album_id: AlbumId) -> Option<Album>;

    /// Albums by one artist within one genre
    fn albums_by_artist_and_genre(&self, artist_id: ArtistId, genre_id: GenreId) -> Vec<AlbumId>;

    /// Albums by one artist, across genres
    fn albums_by_artist(&self, artist_id: ArtistId) -> Vec<AlbumId>;

    /// Albums filed under a genre
    fn albums_by_genre(&self, genre_id: GenreId) -> Vec<AlbumId>;

    /// Albums that were picked at least once, by ascending popularity
    fn popular_albums(&self, limit: usize) -> Vec<AlbumId>;

    /// Every album in the catalog
    fn all_album_ids(&self) -> Vec<AlbumId>;

    /// Record that the user explicitly chose to play this album
    fn increment_popularity(&self, album_id: AlbumId);

    fn artist_name(&self, artist_id: ArtistId) -> Option<String>;

    fn genre_name(&self, genre_id: GenreId) -> Option<String>;

    /// Cover image for an album, if one is known
    fn album_art_path(&self, _album_id: AlbumId) -> Option<PathBuf> {
        None
    }

    fn track_file_path(&self, track_id: TrackId) -> Option<PathBuf> {
        self.track(track_id).map(|t| t.path)
    }

    fn track_duration(&self, track_id: TrackId) -> Option<Duration> {
        self.track(track_id).map(|t| t.duration())
    }

    fn album_id_by_track(&self, track_id: TrackId) -> Option<AlbumId> {
        self.track(track_id).map(|t| t.album_id)
    }

    fn artist_id_by_album(&self, album_id: AlbumId) -> Option<ArtistId> {
        self.album(album_id).map(|a| a.artist_id)
    }

    fn genre_id_by_album(&self, album_id: AlbumId) -> Option<GenreId> {
        self.album(album_id).map(|a| a.genre_id)
    }
}

/// Transport state reported by an audio backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendState {
    Stopped,
    Paused,
    Playing,
}

/// Single-track audio output
///
/// The backend plays one URI at a time and owns the transport state. End of
/// stream is signalled out of band by the host (see `Player::handle_end_of_stream`
/// in `lark-playback`), never by calling back into the engine.
pub trait AudioBackend: Send {
    /// Bind a new source. `length` is the catalog duration of the track.
    ///
    /// # Errors
    /// Returns an error if the URI cannot be opened
    fn set_uri(&mut self, uri: &str, length: Duration) -> Result<()>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn seek(&mut self, position: Duration) -> Result<()>;

    fn state(&self) -> BackendState;

    fn is_playing(&self) -> bool {
        self.state() == BackendState::Playing
    }

    /// Elapsed position of the bound source, `None` when nothing is loaded
    fn position(&self) -> Option<Duration>;
}
