//! Progress ticks on the tokio timer
//!
//! Each repeating tick is a task that posts [`DaemonEvent::Tick`] to the
//! dispatch loop, so the player only ever sees ticks between other messages.

use crate::event::DaemonEvent;
use lark_playback::{TickHandle, TickScheduler};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct TokioScheduler {
    events: UnboundedSender<DaemonEvent>,
    next_id: u64,
    tasks: HashMap<TickHandle, JoinHandle<()>>,
}

impl TokioScheduler {
    pub fn new(events: UnboundedSender<DaemonEvent>) -> Self {
        Self {
            events,
            next_id: 0,
            tasks: HashMap::new(),
        }
    }

    /// Number of live repeating ticks
    pub fn active(&self) -> usize {
        self.tasks.len()
    }
}

impl TickScheduler for TokioScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if events.send(DaemonEvent::Tick(handle)).is_err() {
                    break;
                }
            }
        });

        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
