//! Dispatcher fixture over a real `SQLite` file

#![allow(dead_code)]

use lark_core::{AlbumId, TrackId};
use lark_storage::tracks::{self, NewTrack};
use lark_storage::{albums, artists, genres, Catalog};
use larkd::{DaemonConfig, DaemonEvent, Dispatcher};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver};

pub struct TestDb {
    pub pool: SqlitePool,
    pub dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", dir.path().join("test.db").display());

        let pool = lark_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");
        lark_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self { pool, dir }
    }

    /// File an album under (artist, genre) with tracks of `secs` seconds each
    pub async fn album(&self, name: &str, artist: &str, genre: &str, tracks: &[&str], secs: u32) -> (AlbumId, Vec<TrackId>) {
        let artist_id = artists::get_or_create(&self.pool, artist).await.unwrap();
        let genre_id = genres::get_or_create(&self.pool, genre).await.unwrap();
        let album_id = albums::get_or_create(&self.pool, name, artist_id, genre_id)
            .await
            .unwrap();

        let mut ids = Vec::new();
        for (n, title) in (1u32..).zip(tracks) {
            let id = tracks::insert(
                &self.pool,
                &NewTrack {
                    name: (*title).to_string(),
                    path: PathBuf::from(format!("/music/{}/{}.flac", name, title)),
                    duration_secs: secs,
                    track_number: n,
                    year: None,
                    album_id,
                },
            )
            .await
            .unwrap();
            ids.push(id);
        }
        (album_id, ids)
    }

    pub fn config(&self) -> DaemonConfig {
        let mut config = DaemonConfig::default();
        config.library.music_dir = self.dir.path().join("music");
        config.playback.rng_seed = Some(42);
        config
    }
}

pub struct Daemon {
    pub dispatcher: Dispatcher<Vec<u8>>,
    pub rx: UnboundedReceiver<DaemonEvent>,
    pub catalog: Arc<Catalog>,
    read: usize,
}

impl Daemon {
    pub async fn start(db: &TestDb) -> Self {
        Self::with_config(db, db.config()).await
    }

    pub async fn with_config(db: &TestDb, config: DaemonConfig) -> Self {
        let catalog = Arc::new(Catalog::load(&db.pool).await.unwrap());
        let (tx, rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(db.pool.clone(), catalog.clone(), &config, tx, Vec::new());
        dispatcher.restore_settings().await.unwrap();

        Self {
            dispatcher,
            rx,
            catalog,
            read: 0,
        }
    }

    /// Send one protocol line and handle everything it queued
    pub async fn send(&mut self, line: &str) {
        self.dispatcher
            .handle(DaemonEvent::Line(line.to_string()))
            .await
            .unwrap();
        self.pump().await;
    }

    /// Handle every message already queued
    pub async fn pump(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.dispatcher.handle(event).await.unwrap();
        }
    }

    /// Wait for messages until `done` holds, handling each one
    pub async fn run_until(&mut self, mut done: impl FnMut(&Dispatcher<Vec<u8>>) -> bool) {
        for _ in 0..1000 {
            if done(&self.dispatcher) {
                return;
            }
            let event = self.rx.recv().await.expect("channel closed");
            self.dispatcher.handle(event).await.unwrap();
        }
        panic!("condition never reached");
    }

    /// Output lines written since the last call
    pub fn take_output(&mut self) -> Vec<String> {
        let text = String::from_utf8(self.dispatcher.output().clone()).unwrap();
        let lines: Vec<String> = text.lines().skip(self.read).map(String::from).collect();
        self.read += lines.len();
        lines
    }
}

/// Write a silent 16-bit mono PCM WAV file
pub fn write_silent_wav(path: &std::path::Path, secs: u32) {
    const SAMPLE_RATE: u32 = 8000;
    let data_len = SAMPLE_RATE * 2 * secs;

    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    bytes.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}
