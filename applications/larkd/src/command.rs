//! Line protocol spoken on stdin
//!
//! One command per line. Transport verbs are the remote-control verbs of
//! [`RemoteCommand`]; the rest drive browsing, the queue and the catalog.

use crate::error::{DaemonError, Result};
use lark_core::{ArtistId, GenreId, TrackId};
use lark_playback::{PartyScope, RemoteCommand};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Remote(RemoteCommand),
    /// `load <track>`: play a track without touching the context
    Load(TrackId),
    /// `select <track> [artist|-] [genre|-]`: play a track picked while browsing
    Select {
        track_id: TrackId,
        artist_id: Option<ArtistId>,
        genre_id: Option<GenreId>,
    },
    /// `context <artist|-> <genre|-> <track>`
    Context {
        artist_id: Option<ArtistId>,
        genre_id: Option<GenreId>,
        track_id: TrackId,
    },
    Enqueue(TrackId),
    Dequeue(TrackId),
    Queue,
    ClearQueue,
    PartyScope(PartyScope),
    Now,
    Search(String),
    Scan,
    Quit,
}

fn invalid(line: &str) -> DaemonError {
    DaemonError::InvalidCommand(line.to_string())
}

fn track_arg(word: Option<&str>, line: &str) -> Result<TrackId> {
    word.and_then(|w| w.parse().ok()).ok_or_else(|| invalid(line))
}

/// Parse an optional id where `-` stands for "none"
fn optional_arg(word: Option<&str>, line: &str) -> Result<Option<i64>> {
    match word {
        None | Some("-") => Ok(None),
        Some(w) => w.parse().map(Some).map_err(|_| invalid(line)),
    }
}

impl FromStr for Command {
    type Err = DaemonError;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let mut words = rest.split_whitespace();

        let command = match verb.to_ascii_lowercase().as_str() {
            "" => return Err(invalid(line)),
            "load" => Command::Load(track_arg(words.next(), line)?),
            "select" => Command::Select {
                track_id: track_arg(words.next(), line)?,
                artist_id: optional_arg(words.next(), line)?,
                genre_id: optional_arg(words.next(), line)?,
            },
            "context" => {
                let (Some(artist), Some(genre)) = (words.next(), words.next()) else {
                    return Err(invalid(line));
                };
                Command::Context {
                    artist_id: optional_arg(Some(artist), line)?,
                    genre_id: optional_arg(Some(genre), line)?,
                    track_id: track_arg(words.next(), line)?,
                }
            }
            "enqueue" => Command::Enqueue(track_arg(words.next(), line)?),
            "dequeue" => Command::Dequeue(track_arg(words.next(), line)?),
            "queue" => Command::Queue,
            "clear-queue" => Command::ClearQueue,
            "party-scope" => {
                let scope = rest.parse().map_err(|_| invalid(line))?;
                return Ok(Command::PartyScope(scope));
            }
            "now" => Command::Now,
            "search" if !rest.is_empty() => return Ok(Command::Search(rest.to_string())),
            "scan" => Command::Scan,
            "quit" | "exit" => Command::Quit,
            _ => return line.parse().map(Command::Remote).map_err(|_| invalid(line)),
        };

        if words.next().is_some() {
            return Err(invalid(line));
        }
        Ok(command)
    }
}
