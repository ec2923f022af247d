//! Shuffle history
//!
//! Track ids played while shuffle or party mode is on, used to avoid
//! repeats and to walk backwards with `prev`.

use lark_core::TrackId;
use std::collections::HashSet;

/// Ordered record of tracks played in shuffle/party mode (most recent = back)
#[derive(Debug, Clone, Default)]
pub struct ShuffleHistory {
    tracks: Vec<TrackId>,
}

impl ShuffleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, track_id: TrackId) {
        self.tracks.push(track_id);
    }

    /// Drop the current entry and the one before it, returning the latter
    ///
    /// The caller loads the returned track, which records it again. With
    /// fewer than two entries nothing is removed.
    pub fn step_back(&mut self) -> Option<TrackId> {
        if self.tracks.len() < 2 {
            return None;
        }
        self.tracks.pop();
        self.tracks.pop()
    }

    /// Entry that `step_back` would return, without removing anything
    pub fn peek_previous(&self) -> Option<TrackId> {
        self.tracks.len().checked_sub(2).map(|i| self.tracks[i])
    }

    pub fn contains(&self, track_id: TrackId) -> bool {
        self.tracks.contains(&track_id)
    }

    /// Snapshot for membership tests during candidate selection
    pub fn played(&self) -> HashSet<TrackId> {
        self.tracks.iter().copied().collect()
    }

    /// All entries, oldest first
    pub fn as_slice(&self) -> &[TrackId] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
