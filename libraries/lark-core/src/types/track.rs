//! Track types

use super::AlbumId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub type TrackId = i64;

/// A track in the catalog
///
/// Immutable from the playback engine's point of view. Tracks are created and
/// removed by collection scanning only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub path: PathBuf,
    /// Length in whole seconds, as read from the file's tags
    pub duration_secs: u32,
    /// Position on the album, 0 when the tag is missing
    pub track_number: u32,
    pub year: Option<String>,
    pub album_id: AlbumId,
}

impl Track {
    pub fn new(id: TrackId, name: impl Into<String>, path: PathBuf, album_id: AlbumId) -> Self {
        Self {
            id,
            name: name.into(),
            path,
            duration_secs: 0,
            track_number: 0,
            year: None,
            album_id,
        }
    }

    #[must_use]
    pub fn with_track_number(mut self, track_number: u32) -> Self {
        self.track_number = track_number;
        self
    }

    #[must_use]
    pub fn with_duration_secs(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    #[must_use]
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }
}
