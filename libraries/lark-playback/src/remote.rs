//! Remote control mapping
//!
//! Translates the standard media-control verbs (media keys, session control
//! protocols) into engine calls, and exposes read-only "now playing"
//! metadata for those surfaces.

use crate::error::{PlaybackError, Result};
use crate::player::{file_uri, Player};
use crate::types::PlaybackStatus;
use lark_core::{TrackId, UNKNOWN};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Standard remote-control verbs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteCommand {
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Previous,
    /// Absolute position in the current track
    Seek(Duration),
    /// Seek, but only if `track_id` is still the current track
    SetPosition { track_id: TrackId, position: Duration },
    SetShuffle(bool),
    SetParty(bool),
}

fn parse_seconds(text: Option<&str>, line: &str) -> Result<Duration> {
    text.and_then(|s| s.parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| PlaybackError::InvalidCommand(line.to_string()))
}

fn parse_switch(text: Option<&str>, line: &str) -> Result<bool> {
    match text {
        Some("on" | "true" | "1") => Ok(true),
        Some("off" | "false" | "0") => Ok(false),
        _ => Err(PlaybackError::InvalidCommand(line.to_string())),
    }
}

impl FromStr for RemoteCommand {
    type Err = PlaybackError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| PlaybackError::InvalidCommand(line.to_string()))?
            .to_ascii_lowercase();

        let command = match verb.as_str() {
            "play" => RemoteCommand::Play,
            "pause" => RemoteCommand::Pause,
            "play-pause" | "playpause" | "toggle" => RemoteCommand::PlayPause,
            "stop" => RemoteCommand::Stop,
            "next" => RemoteCommand::Next,
            "previous" | "prev" => RemoteCommand::Previous,
            "seek" => RemoteCommand::Seek(parse_seconds(words.next(), line)?),
            "set-position" => {
                let track_id = words
                    .next()
                    .and_then(|s| s.parse::<TrackId>().ok())
                    .ok_or_else(|| PlaybackError::InvalidCommand(line.to_string()))?;
                let position = parse_seconds(words.next(), line)?;
                RemoteCommand::SetPosition { track_id, position }
            }
            "shuffle" => RemoteCommand::SetShuffle(parse_switch(words.next(), line)?),
            "party" => RemoteCommand::SetParty(parse_switch(words.next(), line)?),
            _ => return Err(PlaybackError::InvalidCommand(line.to_string())),
        };

        if words.next().is_some() {
            return Err(PlaybackError::InvalidCommand(line.to_string()));
        }
        Ok(command)
    }
}

/// Metadata describing the current track for remote surfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub track_id: TrackId,
    pub url: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub track_number: u32,
    pub art_path: Option<PathBuf>,
    pub length_secs: u32,
    pub status: PlaybackStatus,
    pub shuffle: bool,
    pub party: bool,
    pub can_go_next: bool,
    pub can_go_previous: bool,
}

impl Player {
    /// Apply a remote-control command
    pub fn handle_remote(&mut self, command: RemoteCommand) -> Result<()> {
        match command {
            RemoteCommand::Play => self.play(),
            RemoteCommand::Pause => self.pause(),
            RemoteCommand::PlayPause => self.play_pause(),
            RemoteCommand::Stop => self.stop(),
            RemoteCommand::Next => self.next(),
            RemoteCommand::Previous => self.prev(),
            RemoteCommand::Seek(position) => self.seek(position),
            RemoteCommand::SetPosition { track_id, position } => {
                if self.current_track_id() == Some(track_id) {
                    self.seek(position)
                } else {
                    Ok(())
                }
            }
            RemoteCommand::SetShuffle(on) => {
                self.set_shuffle(on);
                Ok(())
            }
            RemoteCommand::SetParty(on) => self.set_party(on),
        }
    }

    /// Metadata for the current track, `None` when nothing is loaded
    pub fn now_playing(&self) -> Option<NowPlaying> {
        let track_id = self.current_track_id()?;
        let library = self.library();
        let track = library.track(track_id)?;
        let album = library.album(track.album_id);

        let artist = album
            .as_ref()
            .and_then(|a| library.artist_name(a.artist_id))
            .unwrap_or_else(|| UNKNOWN.to_string());
        let genre = album
            .as_ref()
            .and_then(|a| library.genre_name(a.genre_id))
            .unwrap_or_else(|| UNKNOWN.to_string());

        Some(NowPlaying {
            track_id,
            url: file_uri(&track.path),
            title: track.name,
            artist,
            album: album.map_or_else(|| UNKNOWN.to_string(), |a| a.name),
            genre,
            track_number: track.track_number,
            art_path: library.album_art_path(track.album_id),
            length_secs: track.duration_secs,
            status: self.playback_status(),
            shuffle: self.is_shuffle(),
            party: self.is_party(),
            can_go_next: self.has_next(),
            can_go_previous: self.has_previous(),
        })
    }
}
