//! Single-task dispatch loop
//!
//! The [`Dispatcher`] owns the [`Player`]. Protocol lines, end-of-stream
//! notifications, progress ticks, player events and scan results all arrive
//! on one channel and are handled strictly in arrival order, so the player is
//! never touched from two places at once.

use crate::backend::ClockBackend;
use crate::command::Command;
use crate::config::DaemonConfig;
use crate::error::Result;
use crate::event::DaemonEvent;
use crate::scheduler::TokioScheduler;
use lark_core::LibraryStore;
use lark_importer::{CollectionScanner, ImportError, ScanReport};
use lark_playback::{PartyScope, Player, PlayerEvent, RemoteCommand};
use lark_storage::settings::{self, SETTING_PARTY_SCOPE, SETTING_SHUFFLE};
use lark_storage::{tracks, Catalog};
use sqlx::SqlitePool;
use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Results returned by `search`
const SEARCH_LIMIT: usize = 25;

/// Whether the loop keeps running after a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Dispatcher<W> {
    player: Player,
    pool: SqlitePool,
    catalog: Arc<Catalog>,
    music_dir: PathBuf,
    /// Generation of the backend's live end-of-stream timer
    generation: Arc<AtomicU64>,
    events: UnboundedSender<DaemonEvent>,
    out: W,
    scanning: bool,
}

impl<W: Write> Dispatcher<W> {
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<Catalog>,
        config: &DaemonConfig,
        events: UnboundedSender<DaemonEvent>,
        out: W,
    ) -> Self {
        let backend = ClockBackend::new(events.clone());
        let generation = backend.generation();
        let scheduler = TokioScheduler::new(events.clone());
        let store: Arc<dyn LibraryStore> = catalog.clone();

        let mut player = Player::new(
            store,
            Box::new(backend),
            Box::new(scheduler),
            config.playback.clone(),
        );

        let tx = events.clone();
        player.subscribe(move |event| {
            // Closed only once the loop is shutting down
            let _ = tx.send(DaemonEvent::Player(event.clone()));
        });
        let tx = events.clone();
        player.set_progress_callback(move |progress| {
            let _ = tx.send(DaemonEvent::Progress(progress));
        });

        Self {
            player,
            pool,
            catalog,
            music_dir: config.library.music_dir.clone(),
            generation,
            events,
            out,
            scanning: false,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    /// Apply the party scope and shuffle mode saved by a previous session
    pub async fn restore_settings(&mut self) -> Result<()> {
        if let Some(scope) = settings::get_typed::<PartyScope>(&self.pool, SETTING_PARTY_SCOPE).await? {
            debug!(%scope, "Restoring party scope");
            self.player.set_party_scope(scope);
        }
        if let Some(shuffle) = settings::get_typed::<bool>(&self.pool, SETTING_SHUFFLE).await? {
            self.player.set_shuffle(shuffle);
        }
        Ok(())
    }

    /// Handle messages until `quit`, end of input, or the channel closes
    pub async fn run(mut self, mut rx: UnboundedReceiver<DaemonEvent>) -> Result<()> {
        while let Some(event) = rx.recv().await {
            match self.handle(event).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) => {
                    warn!("Dispatch failed: {}", err);
                    self.reply(format_args!("error {}", err))?;
                }
            }
        }

        self.shutdown().await
    }

    /// Handle one message
    pub async fn handle(&mut self, event: DaemonEvent) -> Result<Flow> {
        match event {
            DaemonEvent::Line(line) => return self.handle_line(&line).await,
            DaemonEvent::InputClosed => return Ok(Flow::Quit),
            DaemonEvent::EndOfStream { generation } => {
                if generation == self.generation.load(Ordering::SeqCst) {
                    self.player.handle_end_of_stream()?;
                } else {
                    debug!(generation, "Dropping stale end of stream");
                }
            }
            DaemonEvent::Tick(handle) => self.player.on_progress_tick(handle),
            DaemonEvent::Progress(progress) => self.reply(format_args!(
                "progress {} {}",
                progress.elapsed.as_secs(),
                progress.duration.as_secs()
            ))?,
            DaemonEvent::Player(event) => self.on_player_event(event).await?,
            DaemonEvent::ScanFinished(result) => self.on_scan_finished(result).await?,
        }
        Ok(Flow::Continue)
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }

        let result = match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(flow) => Ok(flow),
            Err(err) => {
                debug!(line, "Command failed: {}", err);
                self.reply(format_args!("error {}", err))?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Remote(remote) => {
                self.player.handle_remote(remote)?;
                if let RemoteCommand::SetShuffle(_) = remote {
                    settings::set_typed(&self.pool, SETTING_SHUFFLE, &self.player.is_shuffle())
                        .await?;
                }
            }
            Command::Load(track_id) => self.player.load(track_id)?,
            Command::Select {
                track_id,
                artist_id,
                genre_id,
            } => {
                self.player.play_selection(track_id, artist_id, genre_id)?;
                self.catalog.flush_popularity(&self.pool).await?;
            }
            Command::Context {
                artist_id,
                genre_id,
                track_id,
            } => self.player.set_context(artist_id, genre_id, track_id),
            Command::Enqueue(track_id) => self.player.add_to_playlist(track_id),
            Command::Dequeue(track_id) => {
                if !self.player.remove_from_playlist(track_id) {
                    self.reply(format_args!("error track {} is not queued", track_id))?;
                    return Ok(Flow::Continue);
                }
            }
            Command::Queue => {
                let queue = self
                    .player
                    .playlist()
                    .iter()
                    .fold(String::from("queue"), |line, id| format!("{} {}", line, id));
                self.reply(queue)?;
                return Ok(Flow::Continue);
            }
            Command::ClearQueue => self.player.clear_playlist(),
            Command::PartyScope(scope) => self.player.set_party_scope(scope),
            Command::Now => {
                match self.player.now_playing() {
                    Some(now) => {
                        let json = serde_json::to_string(&now).map_err(std::io::Error::from)?;
                        self.reply(format_args!("now {}", json))?;
                    }
                    None => self.reply("now none")?,
                }
                return Ok(Flow::Continue);
            }
            Command::Search(text) => {
                for track in tracks::search(&self.pool, &text, SEARCH_LIMIT).await? {
                    self.reply(format_args!("track {}\t{}", track.id, track.name))?;
                }
            }
            Command::Scan => {
                if !self.start_scan() {
                    self.reply("error scan already running")?;
                    return Ok(Flow::Continue);
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        }

        self.reply("ok")?;
        Ok(Flow::Continue)
    }

    /// Start a background collection scan; false if one is running
    pub fn start_scan(&mut self) -> bool {
        if self.scanning {
            return false;
        }
        self.scanning = true;

        let receiver = CollectionScanner::new(self.music_dir.clone()).spawn(self.pool.clone());
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = receiver.await.unwrap_or(Err(ImportError::Cancelled));
            let _ = events.send(DaemonEvent::ScanFinished(result));
        });
        true
    }

    async fn on_scan_finished(&mut self, result: std::result::Result<ScanReport, ImportError>) -> Result<()> {
        self.scanning = false;
        match result {
            Ok(report) => {
                self.catalog.refresh(&self.pool).await?;
                info!(tracks = self.catalog.track_count(), "Catalog refreshed");
                self.reply(format_args!(
                    "scan added={} kept={} removed={} errors={} genres={}",
                    report.tracks_added,
                    report.tracks_kept,
                    report.tracks_removed,
                    report.errors.len(),
                    report.genres.len()
                ))
            }
            Err(err) => {
                warn!("Collection scan failed: {}", err);
                self.reply(format_args!("error scan failed: {}", err))
            }
        }
    }

    async fn on_player_event(&mut self, event: PlayerEvent) -> Result<()> {
        match event {
            PlayerEvent::CurrentChanged { track_id } => self.reply(format_args!("current {}", track_id)),
            PlayerEvent::PlaybackStatusChanged { status } => self.reply(format_args!("status {}", status)),
            PlayerEvent::PlaylistChanged { length } => self.reply(format_args!("playlist {}", length)),
            PlayerEvent::PartyScopeChanged { scope } => {
                settings::set_typed(&self.pool, SETTING_PARTY_SCOPE, &scope).await?;
                self.reply(format_args!("party-scope {}", scope))
            }
        }
    }

    async fn shutdown(mut self) -> Result<()> {
        self.player.stop()?;
        let flushed = self.catalog.flush_popularity(&self.pool).await?;
        info!(albums = flushed, "Dispatcher stopped");
        Ok(())
    }

    fn reply(&mut self, message: impl Display) -> Result<()> {
        writeln!(self.out, "{}", message)?;
        self.out.flush()?;
        Ok(())
    }
}
