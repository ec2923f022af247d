//! Album types

use super::{ArtistId, GenreId};
use serde::{Deserialize, Serialize};

pub type AlbumId = i64;

/// An album
///
/// Albums are keyed by (name, artist, genre): the same title filed under two
/// genres is two albums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub artist_id: ArtistId,
    pub genre_id: GenreId,
    /// Incremented each time the user explicitly picks the album to play
    pub popularity: i64,
}

impl Album {
    pub fn new(id: AlbumId, name: impl Into<String>, artist_id: ArtistId, genre_id: GenreId) -> Self {
        Self {
            id,
            name: name.into(),
            artist_id,
            genre_id,
            popularity: 0,
        }
    }

    #[must_use]
    pub fn with_popularity(mut self, popularity: i64) -> Self {
        self.popularity = popularity;
        self
    }
}
