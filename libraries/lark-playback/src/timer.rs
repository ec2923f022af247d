//! Progress timer contract
//!
//! The engine does not own a clock. The host supplies a scheduler that fires
//! repeating ticks on the engine's dispatch queue and routes each one to
//! `Player::on_progress_tick`.

use std::time::Duration;

/// Identifies one scheduled repeating tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// Host timer facility
pub trait TickScheduler: Send {
    /// Start a repeating tick with the given period
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle;

    /// Stop a tick. Cancelling an unknown or already cancelled handle is a no-op.
    fn cancel(&mut self, handle: TickHandle);
}
