//! User playlist
//!
//! Tracks queued explicitly by the user, consumed head-first ahead of
//! context and shuffle advancement.

use lark_core::TrackId;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct UserPlaylist {
    tracks: VecDeque<TrackId>,
}

impl UserPlaylist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole playlist
    pub fn set(&mut self, tracks: impl IntoIterator<Item = TrackId>) {
        self.tracks = tracks.into_iter().collect();
    }

    pub fn push(&mut self, track_id: TrackId) {
        self.tracks.push_back(track_id);
    }

    /// Remove the first occurrence of `track_id`
    ///
    /// Returns false, leaving the playlist untouched, when the id is absent.
    pub fn remove(&mut self, track_id: TrackId) -> bool {
        match self.position(track_id) {
            Some(index) => {
                self.tracks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, track_id: TrackId) -> bool {
        self.tracks.contains(&track_id)
    }

    /// 0-based index of the first occurrence
    pub fn position(&self, track_id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|&id| id == track_id)
    }

    pub fn pop_front(&mut self) -> Option<TrackId> {
        self.tracks.pop_front()
    }

    pub fn peek_front(&self) -> Option<TrackId> {
        self.tracks.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.tracks.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<TrackId> {
        self.tracks.iter().copied().collect()
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
