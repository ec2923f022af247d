//! Catalog synchronization with the music directory
//!
//! A scan imports files the catalog has never seen, keeps the ones it
//! already knows, removes tracks whose files disappeared and finally drops
//! albums, artists and genres left without tracks. A file that fails to
//! import is recorded in the report and the scan moves on.

use crate::metadata::{self, TrackTags};
use crate::scanner::FileScanner;
use crate::{ImportError, Result};
use chrono::{DateTime, Utc};
use lark_core::Genre;
use lark_storage::tracks::{self, NewTrack};
use lark_storage::{albums, artists, genres, library};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// A file that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a collection scan
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub files_discovered: usize,
    pub tracks_added: usize,
    pub tracks_kept: usize,
    pub tracks_removed: usize,
    pub errors: Vec<ScanFailure>,
    /// Genres in the catalog once the scan finished
    pub genres: Vec<Genre>,
    pub finished_at: DateTime<Utc>,
}

/// Scanner keeping the catalog in line with a music directory
#[derive(Debug, Clone)]
pub struct CollectionScanner {
    root: PathBuf,
    file_scanner: FileScanner,
}

impl CollectionScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file_scanner: FileScanner::new(),
        }
    }

    #[must_use]
    pub fn with_file_scanner(mut self, file_scanner: FileScanner) -> Self {
        self.file_scanner = file_scanner;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Synchronize the catalog with the music directory
    ///
    /// Fails without touching the catalog when the root cannot be walked, so
    /// an unmounted music directory never empties the library.
    pub async fn scan(&self, pool: &SqlitePool) -> Result<ScanReport> {
        info!(root = %self.root.display(), "Collection scan started");

        let files = {
            let scanner = self.file_scanner.clone();
            let root = self.root.clone();
            tokio::task::spawn_blocking(move || scanner.scan_directory(&root))
                .await
                .map_err(|_| ImportError::Cancelled)??
        };

        let mut known: HashSet<PathBuf> = tracks::all_paths(pool).await?.into_iter().collect();
        let mut tracks_added = 0;
        let mut tracks_kept = 0;
        let mut errors = Vec::new();

        for path in &files {
            if known.remove(path) {
                tracks_kept += 1;
                continue;
            }

            match import_file(pool, path).await {
                Ok(()) => tracks_added += 1,
                Err(err) => {
                    warn!("Failed to import {}: {}", path.display(), err);
                    errors.push(ScanFailure {
                        path: path.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        let mut tracks_removed = 0;
        for path in known {
            if tracks::remove_by_path(pool, &path).await? {
                debug!(path = %path.display(), "Removed vanished track");
                tracks_removed += 1;
            }
        }

        let orphans = library::clean_orphans(pool).await?;
        debug!(?orphans, "Orphans cleaned");

        let report = ScanReport {
            files_discovered: files.len(),
            tracks_added,
            tracks_kept,
            tracks_removed,
            errors,
            genres: genres::get_all(pool).await?,
            finished_at: Utc::now(),
        };

        info!(
            added = report.tracks_added,
            kept = report.tracks_kept,
            removed = report.tracks_removed,
            errors = report.errors.len(),
            "Collection scan finished"
        );
        Ok(report)
    }

    /// Run [`scan`](Self::scan) on a worker task
    ///
    /// The receiver yields the report once; it resolves to an error if the
    /// worker is dropped first.
    pub fn spawn(self, pool: SqlitePool) -> oneshot::Receiver<Result<ScanReport>> {
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = self.scan(&pool).await;
            if tx.send(result).is_err() {
                debug!("Scan finished after its receiver was dropped");
            }
        });
        rx
    }
}

async fn import_file(pool: &SqlitePool, path: &Path) -> Result<()> {
    let tags = {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || metadata::read_track_tags(&path))
            .await
            .map_err(|_| ImportError::Cancelled)??
    };
    add_track(pool, path, tags).await
}

/// File a track under its (album, artist, genre), creating them as needed
pub async fn add_track(pool: &SqlitePool, path: &Path, tags: TrackTags) -> Result<()> {
    let artist_id = artists::get_or_create(pool, &tags.artist).await?;
    let genre_id = genres::get_or_create(pool, &tags.genre).await?;
    let album_id = albums::get_or_create(pool, &tags.album, artist_id, genre_id).await?;

    tracks::insert(
        pool,
        &NewTrack {
            name: tags.title,
            path: path.to_path_buf(),
            duration_secs: tags.duration_secs,
            track_number: tags.track_number,
            year: tags.year,
            album_id,
        },
    )
    .await?;
    Ok(())
}
