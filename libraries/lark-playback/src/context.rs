//! Listening context and playback cursor

use crate::types::PartyScope;
use lark_core::{AlbumId, ArtistId, GenreId, LibraryStore, TrackId};
use serde::{Deserialize, Serialize};

/// How the current album set was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextScope {
    /// Albums by one artist within one genre
    ArtistInGenre { artist_id: ArtistId, genre_id: GenreId },
    /// Albums by one artist across genres
    Artist { artist_id: ArtistId },
    /// Albums filed under one genre
    Genre { genre_id: GenreId },
    /// The popular albums fallback
    Popular,
    /// Albums eligible in party mode
    Party,
}

/// Ordered album set used for sequential navigation and random picks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListeningContext {
    scope: ContextScope,
    albums: Vec<AlbumId>,
}

impl ListeningContext {
    /// Build a context, dropping duplicate album ids after their first occurrence
    pub fn new(scope: ContextScope, albums: impl IntoIterator<Item = AlbumId>) -> Self {
        let mut unique = Vec::new();
        for album in albums {
            if !unique.contains(&album) {
                unique.push(album);
            }
        }
        Self {
            scope,
            albums: unique,
        }
    }

    pub fn empty() -> Self {
        Self::new(ContextScope::Popular, [])
    }

    /// Resolve the album set for a browse selection
    pub fn for_selection(
        store: &dyn LibraryStore,
        artist_id: Option<ArtistId>,
        genre_id: Option<GenreId>,
        popular_limit: usize,
    ) -> Self {
        match (artist_id, genre_id) {
            (Some(artist_id), Some(genre_id)) => Self::new(
                ContextScope::ArtistInGenre { artist_id, genre_id },
                store.albums_by_artist_and_genre(artist_id, genre_id),
            ),
            (Some(artist_id), None) => Self::new(
                ContextScope::Artist { artist_id },
                store.albums_by_artist(artist_id),
            ),
            (None, Some(genre_id)) => {
                Self::new(ContextScope::Genre { genre_id }, store.albums_by_genre(genre_id))
            }
            (None, None) => Self::new(ContextScope::Popular, store.popular_albums(popular_limit)),
        }
    }

    /// Resolve the album set eligible in party mode
    pub fn for_party(store: &dyn LibraryStore, scope: &PartyScope, popular_limit: usize) -> Self {
        use crate::types::PartyEntry;

        if scope.covers_all() {
            return Self::new(ContextScope::Party, store.all_album_ids());
        }

        let mut albums = Vec::new();
        for entry in scope.entries() {
            match *entry {
                PartyEntry::Genre(genre_id) => albums.extend(store.albums_by_genre(genre_id)),
                PartyEntry::Popular => albums.extend(store.popular_albums(popular_limit)),
                PartyEntry::All => {}
            }
        }
        Self::new(ContextScope::Party, albums)
    }

    pub fn scope(&self) -> ContextScope {
        self.scope
    }

    pub fn albums(&self) -> &[AlbumId] {
        &self.albums
    }

    pub fn contains(&self, album_id: AlbumId) -> bool {
        self.albums.contains(&album_id)
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// Every album once, starting after `album_id` and wrapping around
    ///
    /// The reference album comes last. If it is not part of the context the
    /// walk starts at the first album.
    pub fn following(&self, album_id: AlbumId) -> impl Iterator<Item = AlbumId> + '_ {
        let len = self.albums.len();
        let start = self
            .albums
            .iter()
            .position(|&id| id == album_id)
            .map_or(0, |p| p + 1);
        (0..len).map(move |i| self.albums[(start + i) % len])
    }

    /// Every album once, starting before `album_id` and wrapping around
    ///
    /// The reference album comes last. If it is not part of the context the
    /// walk starts at the last album.
    pub fn preceding(&self, album_id: AlbumId) -> impl Iterator<Item = AlbumId> + '_ {
        let len = self.albums.len();
        let anchor = self.albums.iter().position(|&id| id == album_id).unwrap_or(0);
        (0..len).map(move |i| self.albums[(anchor + len - 1 - i) % len])
    }
}

impl Default for ListeningContext {
    fn default() -> Self {
        Self::empty()
    }
}

/// Position of the current track within its album
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub album_id: AlbumId,
    /// Index into the album's track list (ordered by track number)
    pub track_index: usize,
    pub track_id: TrackId,
}

impl Cursor {
    /// Locate a track within its album, `None` if the catalog does not know it
    pub fn locate(store: &dyn LibraryStore, track_id: TrackId) -> Option<Self> {
        let album_id = store.album_id_by_track(track_id)?;
        let track_index = store
            .track_ids_by_album(album_id)
            .iter()
            .position(|&id| id == track_id)?;
        Some(Self {
            album_id,
            track_index,
            track_id,
        })
    }
}
