//! In-memory catalog snapshot
//!
//! The playback engine queries the catalog synchronously on its dispatch
//! thread, so `Catalog` keeps a full snapshot of the library in memory and
//! answers [`LibraryStore`] calls from it. Popularity bumps are applied to the
//! snapshot at once and journaled; [`Catalog::flush_popularity`] writes them
//! back to SQLite.

use crate::{albums, artists, genres, tracks};
use lark_core::{
    error::Result, Album, AlbumId, Artist, ArtistId, Genre, GenreId, LarkError, LibraryStore,
    Track, TrackId,
};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, info};

/// Cover image file names looked up next to an album's tracks
const COVER_NAMES: &[&str] = &["cover.jpg", "cover.png", "folder.jpg", "front.jpg"];

#[derive(Debug, Default)]
struct Snapshot {
    tracks: HashMap<TrackId, Track>,
    albums: BTreeMap<AlbumId, Album>,
    /// Track ids per album, by ascending track number
    album_tracks: HashMap<AlbumId, Vec<TrackId>>,
    artists: HashMap<ArtistId, String>,
    genres: BTreeMap<GenreId, String>,
}

impl Snapshot {
    fn build(tracks: Vec<Track>, albums: Vec<Album>, artists: Vec<Artist>, genres: Vec<Genre>) -> Self {
        let mut album_tracks: HashMap<AlbumId, Vec<&Track>> = HashMap::new();
        for track in &tracks {
            album_tracks.entry(track.album_id).or_default().push(track);
        }
        let album_tracks = album_tracks
            .into_iter()
            .map(|(album_id, mut list)| {
                list.sort_by_key(|t| (t.track_number, t.id));
                (album_id, list.into_iter().map(|t| t.id).collect())
            })
            .collect();

        Self {
            album_tracks,
            tracks: tracks.into_iter().map(|t| (t.id, t)).collect(),
            albums: albums.into_iter().map(|a| (a.id, a)).collect(),
            artists: artists.into_iter().map(|a| (a.id, a.name)).collect(),
            genres: genres.into_iter().map(|g| (g.id, g.name)).collect(),
        }
    }

    fn album_ids_where(&self, pred: impl Fn(&Album) -> bool) -> Vec<AlbumId> {
        self.albums.values().filter(|a| pred(a)).map(|a| a.id).collect()
    }
}

/// Library snapshot implementing [`LibraryStore`]
#[derive(Debug, Default)]
pub struct Catalog {
    snapshot: RwLock<Snapshot>,
    pending_popularity: Mutex<Vec<AlbumId>>,
}

impl Catalog {
    /// Load the whole library from the database
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let catalog = Self::default();
        catalog.reload(pool).await?;
        Ok(catalog)
    }

    /// Build a catalog from rows already in memory
    pub fn from_parts(
        tracks: Vec<Track>,
        albums: Vec<Album>,
        artists: Vec<Artist>,
        genres: Vec<Genre>,
    ) -> Self {
        Self {
            snapshot: RwLock::new(Snapshot::build(tracks, albums, artists, genres)),
            pending_popularity: Mutex::new(Vec::new()),
        }
    }

    /// Write pending popularity bumps, then reload the snapshot
    pub async fn refresh(&self, pool: &SqlitePool) -> Result<()> {
        self.flush_popularity(pool).await?;
        self.reload(pool).await
    }

    async fn reload(&self, pool: &SqlitePool) -> Result<()> {
        let tracks = tracks::get_all(pool).await?;
        let albums = albums::get_all(pool).await?;
        let artists = artists::get_all(pool).await?;
        let genres = genres::get_all(pool).await?;

        let snapshot = Snapshot::build(tracks, albums, artists, genres);
        info!(
            tracks = snapshot.tracks.len(),
            albums = snapshot.albums.len(),
            "Catalog loaded"
        );
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        Ok(())
    }

    /// Persist popularity bumps made since the last flush
    ///
    /// Returns the number of albums updated. Bumps for albums that no longer
    /// exist are dropped; bumps that failed otherwise stay queued for the
    /// next flush.
    pub async fn flush_popularity(&self, pool: &SqlitePool) -> Result<usize> {
        let pending = std::mem::take(
            &mut *self
                .pending_popularity
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if pending.is_empty() {
            return Ok(0);
        }

        let mut counts: BTreeMap<AlbumId, i64> = BTreeMap::new();
        for album_id in pending {
            *counts.entry(album_id).or_insert(0) += 1;
        }

        let counts: Vec<(AlbumId, i64)> = counts.into_iter().collect();
        let mut written = 0;
        for (index, &(album_id, by)) in counts.iter().enumerate() {
            match albums::increment_popularity(pool, album_id, by).await {
                Ok(()) => written += 1,
                Err(LarkError::NotFound { .. }) => {
                    debug!(album_id, "Dropping popularity bump for removed album");
                }
                Err(err) => {
                    let mut queue = self
                        .pending_popularity
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    for &(id, n) in &counts[index..] {
                        queue.extend(std::iter::repeat(id).take(usize::try_from(n).unwrap_or(0)));
                    }
                    return Err(err);
                }
            }
        }

        debug!(albums = written, "Popularity flushed");
        Ok(written)
    }

    /// Genres, sorted by name
    pub fn genres(&self) -> Vec<Genre> {
        let snapshot = self.read();
        let mut genres: Vec<Genre> = snapshot
            .genres
            .iter()
            .map(|(&id, name)| Genre {
                id,
                name: name.clone(),
            })
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        genres
    }

    pub fn track_count(&self) -> usize {
        self.read().tracks.len()
    }

    pub fn album_count(&self) -> usize {
        self.read().albums.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LibraryStore for Catalog {
    fn track_ids_by_album(&self, album_id: AlbumId) -> Vec<TrackId> {
        self.read()
            .album_tracks
            .get(&album_id)
            .cloned()
            .unwrap_or_default()
    }

    fn track(&self, track_id: TrackId) -> Option<Track> {
        self.read().tracks.get(&track_id).cloned()
    }

    fn album(&self, album_id: AlbumId) -> Option<Album> {
        self.read().albums.get(&album_id).cloned()
    }

    fn albums_by_artist_and_genre(&self, artist_id: ArtistId, genre_id: GenreId) -> Vec<AlbumId> {
        self.read()
            .album_ids_where(|a| a.artist_id == artist_id && a.genre_id == genre_id)
    }

    fn albums_by_artist(&self, artist_id: ArtistId) -> Vec<AlbumId> {
        self.read().album_ids_where(|a| a.artist_id == artist_id)
    }

    fn albums_by_genre(&self, genre_id: GenreId) -> Vec<AlbumId> {
        let snapshot = self.read();
        let mut albums: Vec<&Album> = snapshot
            .albums
            .values()
            .filter(|a| a.genre_id == genre_id)
            .collect();
        albums.sort_by_key(|a| (a.artist_id, a.id));
        albums.into_iter().map(|a| a.id).collect()
    }

    fn popular_albums(&self, limit: usize) -> Vec<AlbumId> {
        let snapshot = self.read();
        let mut albums: Vec<&Album> = snapshot
            .albums
            .values()
            .filter(|a| a.popularity != 0)
            .collect();
        albums.sort_by_key(|a| (a.popularity, a.id));
        albums.into_iter().take(limit).map(|a| a.id).collect()
    }

    fn all_album_ids(&self) -> Vec<AlbumId> {
        self.read().albums.keys().copied().collect()
    }

    fn increment_popularity(&self, album_id: AlbumId) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        let Some(album) = snapshot.albums.get_mut(&album_id) else {
            debug!(album_id, "Popularity bump for unknown album ignored");
            return;
        };
        album.popularity += 1;
        drop(snapshot);

        self.pending_popularity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(album_id);
    }

    fn artist_name(&self, artist_id: ArtistId) -> Option<String> {
        self.read().artists.get(&artist_id).cloned()
    }

    fn genre_name(&self, genre_id: GenreId) -> Option<String> {
        self.read().genres.get(&genre_id).cloned()
    }

    fn album_art_path(&self, album_id: AlbumId) -> Option<PathBuf> {
        let dir = {
            let snapshot = self.read();
            let first = snapshot.album_tracks.get(&album_id)?.first()?;
            snapshot.tracks.get(first)?.path.parent()?.to_path_buf()
        };

        COVER_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}
