//! Core types for the playback engine

use crate::error::PlaybackError;
use lark_core::{BackendState, GenreId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Playback status, derived from the backend's transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No audio is being rendered
    Stopped,
    /// Paused mid-track
    Paused,
    /// Playing audio
    Playing,
}

impl From<BackendState> for PlaybackStatus {
    fn from(state: BackendState) -> Self {
        match state {
            BackendState::Stopped => PlaybackStatus::Stopped,
            BackendState::Paused => PlaybackStatus::Paused,
            BackendState::Playing => PlaybackStatus::Playing,
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackStatus::Stopped => write!(f, "stopped"),
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Playing => write!(f, "playing"),
        }
    }
}

/// Elapsed position reported to the progress callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub elapsed: Duration,
    /// Catalog length of the current track
    pub duration: Duration,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Cap on the "popular albums" fallback context
    #[serde(default = "default_popular_limit")]
    pub popular_limit: usize,

    /// Period of the progress poll
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Start with shuffle enabled
    #[serde(default)]
    pub shuffle: bool,

    /// Fixed seed for random candidate selection (reproducible sessions)
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_popular_limit() -> usize {
    40
}

fn default_progress_interval_ms() -> u64 {
    1000
}

impl PlayerConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            popular_limit: default_popular_limit(),
            progress_interval_ms: default_progress_interval_ms(),
            shuffle: false,
            rng_seed: None,
        }
    }
}

/// One entry of the party scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyEntry {
    /// Every album filed under this genre
    Genre(GenreId),
    /// The "popular albums" set
    Popular,
    /// The whole catalog
    All,
}

impl fmt::Display for PartyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyEntry::Genre(id) => write!(f, "{}", id),
            PartyEntry::Popular => write!(f, "popular"),
            PartyEntry::All => write!(f, "all"),
        }
    }
}

impl FromStr for PartyEntry {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "popular" | "populars" => Ok(PartyEntry::Popular),
            "all" | "*" => Ok(PartyEntry::All),
            other => other
                .parse::<GenreId>()
                .map(PartyEntry::Genre)
                .map_err(|_| PlaybackError::InvalidPartyScope(s.to_string())),
        }
    }
}

/// Genres (and sentinels) eligible for random candidates in party mode
///
/// An empty scope, or one containing [`PartyEntry::All`], covers the whole
/// catalog. Entries keep insertion order and are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartyScope {
    entries: Vec<PartyEntry>,
}

impl PartyScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = PartyEntry>) -> Self {
        let mut scope = Self::new();
        for entry in entries {
            scope.insert(entry);
        }
        scope
    }

    /// Add an entry, returns false if it was already present
    pub fn insert(&mut self, entry: PartyEntry) -> bool {
        if self.entries.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn remove(&mut self, entry: PartyEntry) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| *e != entry);
        self.entries.len() != before
    }

    pub fn contains(&self, entry: PartyEntry) -> bool {
        self.entries.contains(&entry)
    }

    /// True when the scope places no restriction on the catalog
    pub fn covers_all(&self) -> bool {
        self.entries.is_empty() || self.contains(PartyEntry::All)
    }

    pub fn entries(&self) -> &[PartyEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for PartyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "all");
        }
        let parts: Vec<String> = self.entries.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl FromStr for PartyScope {
    type Err = PlaybackError;

    /// Parses a comma separated list such as `3,7,popular`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entries = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<PartyEntry>, _>>()?;
        Ok(Self::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_backend_state() {
        assert_eq!(PlaybackStatus::from(BackendState::Playing), PlaybackStatus::Playing);
        assert_eq!(PlaybackStatus::from(BackendState::Paused), PlaybackStatus::Paused);
        assert_eq!(PlaybackStatus::from(BackendState::Stopped), PlaybackStatus::Stopped);
    }

    #[test]
    fn config_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.popular_limit, 40);
        assert_eq!(config.progress_interval(), Duration::from_secs(1));
        assert!(!config.shuffle);
        assert!(config.rng_seed.is_none());
    }

    #[test]
    fn party_scope_deduplicates_and_keeps_order() {
        let scope = PartyScope::from_entries([
            PartyEntry::Genre(4),
            PartyEntry::Popular,
            PartyEntry::Genre(4),
        ]);
        assert_eq!(scope.entries(), &[PartyEntry::Genre(4), PartyEntry::Popular]);
        assert!(!scope.covers_all());
    }

    #[test]
    fn empty_or_all_scope_covers_catalog() {
        assert!(PartyScope::new().covers_all());
        let scope = PartyScope::from_entries([PartyEntry::Genre(1), PartyEntry::All]);
        assert!(scope.covers_all());
    }

    #[test]
    fn party_scope_parses_text() {
        let scope: PartyScope = "3, 7,popular".parse().unwrap();
        assert_eq!(
            scope.entries(),
            &[PartyEntry::Genre(3), PartyEntry::Genre(7), PartyEntry::Popular]
        );
        assert_eq!(scope.to_string(), "3,7,popular");

        assert!("rock".parse::<PartyScope>().is_err());
    }

    #[test]
    fn party_scope_remove() {
        let mut scope = PartyScope::from_entries([PartyEntry::Genre(2)]);
        assert!(scope.remove(PartyEntry::Genre(2)));
        assert!(!scope.remove(PartyEntry::Genre(2)));
        assert!(scope.is_empty());
    }
}
