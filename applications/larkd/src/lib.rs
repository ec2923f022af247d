//! Lark daemon
//!
//! Hosts the playback engine over the catalog: a clock-driven backend,
//! tokio progress ticks, a line protocol on stdin and background collection
//! scans, all funnelled through one dispatch loop.

pub mod backend;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod scheduler;

pub use config::DaemonConfig;
pub use dispatch::{Dispatcher, Flow};
pub use error::{DaemonError, Result};
pub use event::DaemonEvent;
