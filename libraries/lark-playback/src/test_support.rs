//! In-memory collaborators shared by unit and integration tests
//!
//! Imports go through `super` so the file also compiles when integration
//! tests include it by path.

#![allow(dead_code)]

use super::{Player, PlayerConfig, PlayerEvent, TickHandle, TickScheduler};
use lark_core::{
    Album, AlbumId, ArtistId, AudioBackend, BackendState, GenreId, LarkError, LibraryStore,
    Track, TrackId,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Catalog built album by album; tracks get track numbers in insertion order
#[derive(Default)]
pub struct FakeLibrary {
    albums: Vec<Album>,
    tracks: BTreeMap<TrackId, Track>,
    removed: Mutex<BTreeSet<TrackId>>,
    popularity: Mutex<BTreeMap<AlbumId, i64>>,
}

impl FakeLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn album(
        mut self,
        album_id: AlbumId,
        artist_id: ArtistId,
        genre_id: GenreId,
        tracks: &[TrackId],
    ) -> Self {
        self.albums
            .push(Album::new(album_id, format!("Album {}", album_id), artist_id, genre_id));
        for (n, &track_id) in tracks.iter().enumerate() {
            let track = Track::new(
                track_id,
                format!("Track {}", track_id),
                PathBuf::from(format!("/music/{}/{}.flac", album_id, track_id)),
                album_id,
            )
            .with_track_number(n as u32 + 1)
            .with_duration_secs(180);
            self.tracks.insert(track_id, track);
        }
        self
    }

    pub fn popular(self, album_id: AlbumId, popularity: i64) -> Self {
        self.popularity
            .lock()
            .unwrap()
            .insert(album_id, popularity);
        self
    }

    pub fn popularity_of(&self, album_id: AlbumId) -> i64 {
        self.popularity
            .lock()
            .unwrap()
            .get(&album_id)
            .copied()
            .unwrap_or(0)
    }

    /// Drop a track from the catalog, as a rescan would
    pub fn remove_track(&self, track_id: TrackId) {
        self.removed.lock().unwrap().insert(track_id);
    }

    fn is_removed(&self, track_id: TrackId) -> bool {
        self.removed.lock().unwrap().contains(&track_id)
    }

    fn album_ids_where(&self, pred: impl Fn(&Album) -> bool) -> Vec<AlbumId> {
        self.albums.iter().filter(|a| pred(a)).map(|a| a.id).collect()
    }
}

impl LibraryStore for FakeLibrary {
    fn track_ids_by_album(&self, album_id: AlbumId) -> Vec<TrackId> {
        let mut tracks: Vec<&Track> = self
            .tracks
            .values()
            .filter(|t| t.album_id == album_id && !self.is_removed(t.id))
            .collect();
        tracks.sort_by_key(|t| t.track_number);
        tracks.into_iter().map(|t| t.id).collect()
    }

    fn track(&self, track_id: TrackId) -> Option<Track> {
        if self.is_removed(track_id) {
            return None;
        }
        self.tracks.get(&track_id).cloned()
    }

    fn album(&self, album_id: AlbumId) -> Option<Album> {
        self.albums.iter().find(|a| a.id == album_id).cloned()
    }

    fn albums_by_artist_and_genre(&self, artist_id: ArtistId, genre_id: GenreId) -> Vec<AlbumId> {
        self.album_ids_where(|a| a.artist_id == artist_id && a.genre_id == genre_id)
    }

    fn albums_by_artist(&self, artist_id: ArtistId) -> Vec<AlbumId> {
        self.album_ids_where(|a| a.artist_id == artist_id)
    }

    fn albums_by_genre(&self, genre_id: GenreId) -> Vec<AlbumId> {
        self.album_ids_where(|a| a.genre_id == genre_id)
    }

    fn popular_albums(&self, limit: usize) -> Vec<AlbumId> {
        let popularity = self.popularity.lock().unwrap();
        let mut popular: Vec<(AlbumId, i64)> = popularity
            .iter()
            .filter(|(_, p)| **p != 0)
            .map(|(&id, &p)| (id, p))
            .collect();
        popular.sort_by_key(|&(_, p)| p);
        popular.into_iter().take(limit).map(|(id, _)| id).collect()
    }

    fn all_album_ids(&self) -> Vec<AlbumId> {
        self.albums.iter().map(|a| a.id).collect()
    }

    fn increment_popularity(&self, album_id: AlbumId) {
        *self.popularity.lock().unwrap().entry(album_id).or_insert(0) += 1;
    }

    fn artist_name(&self, artist_id: ArtistId) -> Option<String> {
        Some(format!("Artist {}", artist_id))
    }

    fn genre_name(&self, genre_id: GenreId) -> Option<String> {
        Some(format!("Genre {}", genre_id))
    }
}

#[derive(Debug)]
pub struct BackendLog {
    pub state: BackendState,
    pub uris: Vec<String>,
    pub position: Option<Duration>,
    pub seeks: Vec<Duration>,
    pub fail_set_uri: bool,
}

impl Default for BackendLog {
    fn default() -> Self {
        Self {
            state: BackendState::Stopped,
            uris: Vec::new(),
            position: None,
            seeks: Vec::new(),
            fail_set_uri: false,
        }
    }
}

/// Backend recording every call into a shared log
#[derive(Clone, Default)]
pub struct FakeBackend {
    pub log: Arc<Mutex<BackendLog>>,
}

impl AudioBackend for FakeBackend {
    fn set_uri(&mut self, uri: &str, _length: Duration) -> lark_core::Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.fail_set_uri {
            log.state = BackendState::Stopped;
            return Err(LarkError::backend("cannot open source"));
        }
        log.uris.push(uri.to_string());
        log.position = Some(Duration::ZERO);
        Ok(())
    }

    fn play(&mut self) -> lark_core::Result<()> {
        self.log.lock().unwrap().state = BackendState::Playing;
        Ok(())
    }

    fn pause(&mut self) -> lark_core::Result<()> {
        self.log.lock().unwrap().state = BackendState::Paused;
        Ok(())
    }

    fn stop(&mut self) -> lark_core::Result<()> {
        self.log.lock().unwrap().state = BackendState::Stopped;
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> lark_core::Result<()> {
        let mut log = self.log.lock().unwrap();
        log.seeks.push(position);
        log.position = Some(position);
        Ok(())
    }

    fn state(&self) -> BackendState {
        self.log.lock().unwrap().state
    }

    fn position(&self) -> Option<Duration> {
        self.log.lock().unwrap().position
    }
}

#[derive(Debug, Default)]
pub struct SchedulerLog {
    pub next_id: u64,
    pub active: Vec<TickHandle>,
    pub scheduled: usize,
    pub cancelled: usize,
}

/// Scheduler that never fires on its own
#[derive(Clone, Default)]
pub struct ManualScheduler {
    pub log: Arc<Mutex<SchedulerLog>>,
}

impl TickScheduler for ManualScheduler {
    fn schedule_repeating(&mut self, _period: Duration) -> TickHandle {
        let mut log = self.log.lock().unwrap();
        let handle = TickHandle(log.next_id);
        log.next_id += 1;
        log.scheduled += 1;
        log.active.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        let mut log = self.log.lock().unwrap();
        let before = log.active.len();
        log.active.retain(|h| *h != handle);
        if log.active.len() != before {
            log.cancelled += 1;
        }
    }
}

/// Player wired to fakes, recording every emitted event
pub struct Rig {
    pub player: Player,
    pub library: Arc<FakeLibrary>,
    pub backend: FakeBackend,
    pub scheduler: ManualScheduler,
    pub events: Arc<Mutex<Vec<PlayerEvent>>>,
}

impl Rig {
    pub fn new(library: FakeLibrary) -> Self {
        Self::with_seed(library, 42)
    }

    pub fn with_seed(library: FakeLibrary, seed: u64) -> Self {
        let library = Arc::new(library);
        let backend = FakeBackend::default();
        let scheduler = ManualScheduler::default();
        let store: Arc<dyn LibraryStore> = library.clone();

        let config = PlayerConfig {
            rng_seed: Some(seed),
            ..PlayerConfig::default()
        };
        let mut player = Player::new(
            store,
            Box::new(backend.clone()),
            Box::new(scheduler.clone()),
            config,
        );

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        player.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        Self {
            player,
            library,
            backend,
            scheduler,
            events,
        }
    }

    pub fn take_events(&self) -> Vec<PlayerEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }

    /// Current track after calling `next`
    pub fn next(&mut self) -> Option<TrackId> {
        self.player.next().unwrap();
        self.player.current_track_id()
    }

    /// Current track after calling `prev`
    pub fn prev(&mut self) -> Option<TrackId> {
        self.player.prev().unwrap();
        self.player.current_track_id()
    }
}
