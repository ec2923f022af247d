//! Messages handled by the dispatch loop

use lark_importer::{ImportError, ScanReport};
use lark_playback::{PlayerEvent, Progress, TickHandle};

/// Everything the player reacts to arrives as one of these, in order
#[derive(Debug)]
pub enum DaemonEvent {
    /// A protocol line from the client
    Line(String),
    /// The client closed its input
    InputClosed,
    /// The backend reached the end of the stream armed at `generation`
    EndOfStream { generation: u64 },
    /// A progress timer fired
    Tick(TickHandle),
    /// Progress reported by the player during a tick
    Progress(Progress),
    /// Notification emitted by the player
    Player(PlayerEvent),
    /// A background collection scan finished
    ScanFinished(Result<ScanReport, ImportError>),
}
