//! Playback sequencing engine
//!
//! Owns the listening state (context, cursor, shuffle history, party mode,
//! user playlist), decides what plays next or previous, drives the audio
//! backend, and emits [`PlayerEvent`]s.
//!
//! The player is not shared between threads. The host routes every call,
//! including progress ticks and end-of-stream notifications, through one
//! dispatch queue.

use crate::{
    context::{Cursor, ListeningContext},
    error::{PlaybackError, Result},
    events::{EventBus, PlayerEvent, SubscriptionId},
    history::ShuffleHistory,
    playlist::UserPlaylist,
    shuffle::pick_candidate,
    timer::{TickHandle, TickScheduler},
    types::{PartyScope, PlaybackStatus, PlayerConfig, Progress},
};
use lark_core::{ArtistId, AudioBackend, GenreId, LarkError, LibraryStore, TrackId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

type ProgressCallback = Box<dyn FnMut(Progress) + Send>;

/// Playback sequencing engine
pub struct Player {
    store: Arc<dyn LibraryStore>,
    backend: Box<dyn AudioBackend>,
    scheduler: Box<dyn TickScheduler>,
    config: PlayerConfig,
    rng: StdRng,

    // Listening state
    current: Option<TrackId>,
    cursor: Option<Cursor>,
    duration: Duration,
    context: ListeningContext,
    history: ShuffleHistory,
    playlist: UserPlaylist,
    shuffle: bool,
    party: bool,
    party_scope: PartyScope,

    // Progress reporting
    tick: Option<TickHandle>,
    progress_callback: Option<ProgressCallback>,

    events: EventBus,
}

impl Player {
    /// Create a player over its collaborators
    pub fn new(
        store: Arc<dyn LibraryStore>,
        backend: Box<dyn AudioBackend>,
        scheduler: Box<dyn TickScheduler>,
        config: PlayerConfig,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            store,
            backend,
            scheduler,
            rng,
            current: None,
            cursor: None,
            duration: Duration::ZERO,
            context: ListeningContext::empty(),
            history: ShuffleHistory::new(),
            playlist: UserPlaylist::new(),
            shuffle: config.shuffle,
            party: false,
            party_scope: PartyScope::new(),
            tick: None,
            progress_callback: None,
            events: EventBus::new(),
            config,
        }
    }

    // ===== Events =====

    /// Register an event subscriber
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + Send + 'static,
    {
        self.events.subscribe(subscriber)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ===== Transport =====

    /// Bind a track to the backend and start playing it
    ///
    /// Emits `CurrentChanged` followed by `PlaybackStatusChanged`. Unknown
    /// tracks are logged and ignored.
    pub fn load(&mut self, track_id: TrackId) -> Result<()> {
        let Some(track) = self.store.track(track_id) else {
            warn!(track_id, "Cannot load track missing from the catalog");
            return Ok(());
        };

        self.halt();

        self.current = Some(track_id);
        self.cursor = Cursor::locate(self.store.as_ref(), track_id);
        if self.cursor.is_none() {
            warn!(
                track_id,
                album_id = track.album_id,
                "Track missing from its album listing"
            );
        }
        self.duration = track.duration();
        if self.shuffle || self.party {
            self.history.push(track_id);
        }

        debug!(track_id, path = %track.path.display(), "Loading track");
        self.emit(PlayerEvent::CurrentChanged { track_id });

        let uri = file_uri(&track.path);
        if let Err(err) = self.backend.set_uri(&uri, self.duration) {
            return Err(self.backend_failed(err));
        }

        self.play()
    }

    /// Start or resume playback of the loaded track
    pub fn play(&mut self) -> Result<()> {
        if self.current.is_none() {
            debug!("Play requested with nothing loaded");
            return Ok(());
        }

        if let Err(err) = self.backend.play() {
            return Err(self.backend_failed(err));
        }

        self.arm_progress_timer();
        self.emit_status_changed();
        Ok(())
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        if self.current.is_none() {
            return Ok(());
        }

        if let Err(err) = self.backend.pause() {
            return Err(self.backend_failed(err));
        }

        self.emit_status_changed();
        self.cancel_progress_timer();
        Ok(())
    }

    /// Stop playback
    ///
    /// Cursor, shuffle history and user playlist are left as they are.
    pub fn stop(&mut self) -> Result<()> {
        self.cancel_progress_timer();

        if let Err(err) = self.backend.stop() {
            return Err(self.backend_failed(err));
        }

        self.emit_status_changed();
        Ok(())
    }

    /// Pause if playing, otherwise play
    pub fn play_pause(&mut self) -> Result<()> {
        if self.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Seek within the loaded track
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        if self.current.is_none() {
            return Ok(());
        }

        if let Err(err) = self.backend.seek(position) {
            return Err(self.backend_failed(err));
        }
        Ok(())
    }

    /// The backend reached the end of the current track
    pub fn handle_end_of_stream(&mut self) -> Result<()> {
        debug!(track_id = ?self.current, "End of stream");
        self.next()
    }

    // ===== Navigation =====

    /// Advance: user playlist, then random candidate, then sequential order
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<()> {
        if !self.playlist.is_empty() {
            let queued = self.next_queued();
            self.emit_playlist_changed();
            if let Some(track_id) = queued {
                return self.load(track_id);
            }
        }

        let candidate = if self.shuffle || self.party {
            self.random_candidate()
        } else {
            self.sequential_next()
        };

        match candidate {
            Some(track_id) => self.load(track_id),
            None => {
                debug!("Nothing to advance to");
                Ok(())
            }
        }
    }

    /// Go back: shuffle history in shuffle/party mode, else sequential order
    pub fn prev(&mut self) -> Result<()> {
        let candidate = if self.shuffle || self.party {
            match self.history.peek_previous() {
                Some(track_id) if self.store.track(track_id).is_some() => self.history.step_back(),
                Some(track_id) => {
                    debug!(track_id, "Previous shuffle entry left the catalog");
                    None
                }
                None => None,
            }
        } else {
            self.sequential_prev()
        };

        match candidate {
            Some(track_id) => self.load(track_id),
            None => {
                debug!("Nothing to go back to");
                Ok(())
            }
        }
    }

    /// Pop the playlist up to its first track still in the catalog
    fn next_queued(&mut self) -> Option<TrackId> {
        while let Some(track_id) = self.playlist.pop_front() {
            if self.store.track(track_id).is_some() {
                return Some(track_id);
            }
            debug!(track_id, "Dropping queued track missing from the catalog");
        }
        None
    }

    /// Next track in the album, else the first track of the next non-empty album
    fn sequential_next(&self) -> Option<TrackId> {
        if self.context.is_empty() {
            return None;
        }
        let cursor = self.cursor?;

        let tracks = self.store.track_ids_by_album(cursor.album_id);
        if let Some(&track_id) = tracks.get(cursor.track_index + 1) {
            return Some(track_id);
        }

        self.context
            .following(cursor.album_id)
            .find_map(|album_id| self.store.track_ids_by_album(album_id).first().copied())
    }

    /// Previous track in the album, else the last track of the previous non-empty album
    fn sequential_prev(&self) -> Option<TrackId> {
        if self.context.is_empty() {
            return None;
        }
        let cursor = self.cursor?;

        if let Some(index) = cursor.track_index.checked_sub(1) {
            let tracks = self.store.track_ids_by_album(cursor.album_id);
            if let Some(&track_id) = tracks.get(index) {
                return Some(track_id);
            }
        }

        self.context
            .preceding(cursor.album_id)
            .find_map(|album_id| self.store.track_ids_by_album(album_id).last().copied())
    }

    /// Unplayed track from the context; history is reset once when exhausted
    fn random_candidate(&mut self) -> Option<TrackId> {
        if self.context.is_empty() {
            return None;
        }

        let played = self.history.played();
        let store = self.store.as_ref();
        if let Some(track_id) = pick_candidate(&mut self.rng, store, self.context.albums(), &played) {
            return Some(track_id);
        }

        debug!(played = played.len(), "Every track played, clearing shuffle history");
        self.history.clear();
        pick_candidate(&mut self.rng, store, self.context.albums(), &HashSet::new())
    }

    // ===== Modes =====

    /// Toggle shuffle; turning it off rebuilds the context around the current track
    pub fn set_shuffle(&mut self, shuffle: bool) {
        self.shuffle = shuffle;
        self.history.clear();
        if !shuffle {
            self.restore_context();
        }
    }

    /// Toggle party mode
    ///
    /// Turning it on replaces the context with the albums in the party scope
    /// and loads a random track. Turning it off rebuilds the context around
    /// the current track.
    pub fn set_party(&mut self, party: bool) -> Result<()> {
        self.party = party;
        self.history.clear();

        if !party {
            self.restore_context();
            return Ok(());
        }

        self.context = ListeningContext::for_party(
            self.store.as_ref(),
            &self.party_scope,
            self.config.popular_limit,
        );
        info!(albums = self.context.len(), scope = %self.party_scope, "Party mode on");

        match self.random_candidate() {
            Some(track_id) => self.load(track_id),
            None => Ok(()),
        }
    }

    /// Replace the party scope
    ///
    /// While party mode is on the eligible albums are recomputed; the current
    /// track keeps playing.
    pub fn set_party_scope(&mut self, scope: PartyScope) {
        self.party_scope = scope;
        if self.party {
            self.context = ListeningContext::for_party(
                self.store.as_ref(),
                &self.party_scope,
                self.config.popular_limit,
            );
        }
        let scope = self.party_scope.clone();
        self.emit(PlayerEvent::PartyScopeChanged { scope });
    }

    /// Select the listening context and place the cursor on `track_id`
    ///
    /// Ignored while party mode is on.
    pub fn set_context(
        &mut self,
        artist_id: Option<ArtistId>,
        genre_id: Option<GenreId>,
        track_id: TrackId,
    ) {
        if self.party {
            debug!("Ignoring context change in party mode");
            return;
        }

        self.context = ListeningContext::for_selection(
            self.store.as_ref(),
            artist_id,
            genre_id,
            self.config.popular_limit,
        );
        self.cursor = Cursor::locate(self.store.as_ref(), track_id);
    }

    /// Play a track the user picked from browse or search
    ///
    /// Counts towards the album's popularity unless party mode is on.
    pub fn play_selection(
        &mut self,
        track_id: TrackId,
        artist_id: Option<ArtistId>,
        genre_id: Option<GenreId>,
    ) -> Result<()> {
        if !self.party {
            if let Some(album_id) = self.store.album_id_by_track(track_id) {
                self.store.increment_popularity(album_id);
            }
        }

        self.set_context(artist_id, genre_id, track_id);
        self.load(track_id)
    }

    /// Context equivalent to `set_context` with the current track's album scope
    fn restore_context(&mut self) {
        if self.party {
            return;
        }

        match self.current {
            Some(track_id) => {
                let album_id = self.store.album_id_by_track(track_id);
                let artist_id = album_id.and_then(|id| self.store.artist_id_by_album(id));
                let genre_id = album_id.and_then(|id| self.store.genre_id_by_album(id));
                self.set_context(artist_id, genre_id, track_id);
            }
            None => {
                self.context = ListeningContext::for_selection(
                    self.store.as_ref(),
                    None,
                    None,
                    self.config.popular_limit,
                );
            }
        }
    }

    // ===== User Playlist =====

    /// Replace the user playlist
    pub fn set_playlist(&mut self, tracks: impl IntoIterator<Item = TrackId>) {
        self.playlist.set(tracks);
        self.emit_playlist_changed();
    }

    pub fn add_to_playlist(&mut self, track_id: TrackId) {
        self.playlist.push(track_id);
        self.emit_playlist_changed();
    }

    /// Remove a queued track; returns false and emits nothing when it is absent
    pub fn remove_from_playlist(&mut self, track_id: TrackId) -> bool {
        let removed = self.playlist.remove(track_id);
        if removed {
            self.emit_playlist_changed();
        }
        removed
    }

    pub fn clear_playlist(&mut self) {
        if !self.playlist.is_empty() {
            self.playlist.clear();
            self.emit_playlist_changed();
        }
    }

    pub fn is_in_playlist(&self, track_id: TrackId) -> bool {
        self.playlist.contains(track_id)
    }

    /// 0-based position in the user playlist, `None` when absent
    pub fn position_in_playlist(&self, track_id: TrackId) -> Option<usize> {
        self.playlist.position(track_id)
    }

    pub fn playlist(&self) -> Vec<TrackId> {
        self.playlist.to_vec()
    }

    // ===== Progress =====

    /// Register the callback invoked on each progress tick while playing
    pub fn set_progress_callback<F>(&mut self, callback: F)
    where
        F: FnMut(Progress) + Send + 'static,
    {
        self.progress_callback = Some(Box::new(callback));
    }

    pub fn clear_progress_callback(&mut self) {
        self.progress_callback = None;
    }

    /// Handle one firing of the progress timer
    ///
    /// Ticks from a timer that has since been cancelled are ignored.
    pub fn on_progress_tick(&mut self, handle: TickHandle) {
        if self.tick != Some(handle) || !self.backend.is_playing() {
            return;
        }
        let Some(elapsed) = self.backend.position() else {
            return;
        };

        let duration = self.duration;
        if let Some(callback) = self.progress_callback.as_mut() {
            callback(Progress { elapsed, duration });
        }
    }

    pub fn is_progress_timer_armed(&self) -> bool {
        self.tick.is_some()
    }

    fn arm_progress_timer(&mut self) {
        if self.tick.is_none() {
            let period = self.config.progress_interval();
            self.tick = Some(self.scheduler.schedule_repeating(period));
        }
    }

    fn cancel_progress_timer(&mut self) {
        if let Some(handle) = self.tick.take() {
            self.scheduler.cancel(handle);
        }
    }

    // ===== State Queries =====

    pub fn current_track_id(&self) -> Option<TrackId> {
        self.current
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn context(&self) -> &ListeningContext {
        &self.context
    }

    /// Shuffle history, oldest first
    pub fn history(&self) -> &[TrackId] {
        self.history.as_slice()
    }

    pub fn is_shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn is_party(&self) -> bool {
        self.party
    }

    pub fn party_scope(&self) -> &PartyScope {
        &self.party_scope
    }

    pub fn is_playing(&self) -> bool {
        self.backend.is_playing()
    }

    pub fn playback_status(&self) -> PlaybackStatus {
        self.backend.state().into()
    }

    /// Catalog length of the current track
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Elapsed position reported by the backend
    pub fn position(&self) -> Option<Duration> {
        self.backend.position()
    }

    /// Whether `next` would load something
    pub fn has_next(&self) -> bool {
        if self.playlist.iter().any(|id| self.store.track(id).is_some()) {
            return true;
        }
        if self.shuffle || self.party {
            return self
                .context
                .albums()
                .iter()
                .any(|&album_id| !self.store.track_ids_by_album(album_id).is_empty());
        }
        self.sequential_next().is_some()
    }

    /// Whether `prev` would load something
    pub fn has_previous(&self) -> bool {
        if self.shuffle || self.party {
            return self
                .history
                .peek_previous()
                .is_some_and(|id| self.store.track(id).is_some());
        }
        self.sequential_prev().is_some()
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// The catalog this player reads from
    pub fn library(&self) -> &dyn LibraryStore {
        self.store.as_ref()
    }

    // ===== Internal =====

    /// Stop output ahead of a new load; nothing is emitted
    fn halt(&mut self) {
        self.cancel_progress_timer();
        if let Err(err) = self.backend.stop() {
            warn!(error = %err, "Backend refused to stop before load");
        }
    }

    fn backend_failed(&mut self, err: LarkError) -> PlaybackError {
        error!(error = %err, track_id = ?self.current, "Audio backend failure");
        self.cancel_progress_timer();
        self.emit_status_changed();

        match err {
            LarkError::Backend(message) => PlaybackError::Backend(message),
            other => PlaybackError::Backend(other.to_string()),
        }
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.events.emit(&event);
    }

    fn emit_status_changed(&mut self) {
        let status = self.playback_status();
        self.emit(PlayerEvent::PlaybackStatusChanged { status });
    }

    fn emit_playlist_changed(&mut self) {
        let length = self.playlist.len();
        self.emit(PlayerEvent::PlaylistChanged { length });
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("current", &self.current)
            .field("cursor", &self.cursor)
            .field("context", &self.context)
            .field("shuffle", &self.shuffle)
            .field("party", &self.party)
            .field("playlist", &self.playlist)
            .finish_non_exhaustive()
    }
}

/// `file://` URI for a catalog path
pub(crate) fn file_uri(path: &Path) -> String {
    Url::from_file_path(path)
        .map(String::from)
        .unwrap_or_else(|()| format!("file://{}", path.display()))
}
