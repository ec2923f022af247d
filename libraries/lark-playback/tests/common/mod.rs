//! Shared collaborators for integration tests

#![allow(dead_code)]

pub use lark_playback::{Player, PlayerConfig, PlayerEvent, TickHandle, TickScheduler};

#[path = "../../src/test_support.rs"]
mod fakes;

pub use fakes::*;
