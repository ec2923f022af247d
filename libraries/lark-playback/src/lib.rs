//! Lark - Playback Sequencing
//!
//! The engine that decides what plays next. Given a listening context
//! (genre/artist scope), shuffle and party modes, a user playlist, and the
//! shuffle history, it picks the next or previous track, drives the audio
//! backend, and notifies adapters through typed events.
//!
//! This crate provides:
//! - `Player`: the state machine (load/play/pause/stop/seek, next/prev)
//! - Sequential navigation with album wraparound
//! - Random candidate selection that avoids repeats
//! - Party mode restricted by a persisted `PartyScope`
//! - A head-first user playlist taking priority over everything else
//! - Remote-control verb mapping and "now playing" metadata
//!
//! # Architecture
//!
//! `lark-playback` has no I/O of its own:
//! - The catalog is reached through `lark_core::LibraryStore`
//! - Audio output goes through `lark_core::AudioBackend`
//! - The 1-second progress poll goes through a host `TickScheduler`
//!
//! The host owns the player on a single dispatch queue and feeds it
//! end-of-stream notifications and timer ticks as ordinary calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use lark_playback::{Player, PlayerConfig, PlayerEvent, TickHandle, TickScheduler};
//! # use lark_core::{AudioBackend, LibraryStore};
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # fn collaborators() -> (Arc<dyn LibraryStore>, Box<dyn AudioBackend>) { unimplemented!() }
//!
//! struct NoTimer;
//!
//! impl TickScheduler for NoTimer {
//!     fn schedule_repeating(&mut self, _period: Duration) -> TickHandle {
//!         TickHandle(0)
//!     }
//!     fn cancel(&mut self, _handle: TickHandle) {}
//! }
//!
//! let (library, backend) = collaborators();
//! let mut player = Player::new(library, backend, Box::new(NoTimer), PlayerConfig::default());
//!
//! player.subscribe(|event| {
//!     if let PlayerEvent::CurrentChanged { track_id } = event {
//!         println!("now playing {}", track_id);
//!     }
//! });
//!
//! player.set_context(Some(1), Some(2), 10);
//! player.load(10).ok();
//! player.next().ok();
//! ```

mod context;
mod error;
mod events;
mod history;
mod player;
mod playlist;
pub mod remote;
mod shuffle;
mod timer;
pub mod types;

#[cfg(test)]
mod test_support;

// Public exports
pub use context::{ContextScope, Cursor, ListeningContext};
pub use error::{PlaybackError, Result};
pub use events::{EventBus, PlayerEvent, SubscriptionId};
pub use history::ShuffleHistory;
pub use player::Player;
pub use playlist::UserPlaylist;
pub use remote::{NowPlaying, RemoteCommand};
pub use shuffle::pick_candidate;
pub use timer::{TickHandle, TickScheduler};
pub use types::{PartyEntry, PartyScope, PlaybackStatus, PlayerConfig, Progress};
