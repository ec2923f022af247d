//! Player Events
//!
//! Typed notifications for adapters (UI, notifications, remote control).
//! Events are delivered synchronously, in emission order, to every
//! subscriber at the point of the state transition:
//! - Track changes (`load`)
//! - Transport changes (play/pause/stop, backend failures)
//! - User playlist mutations and consumption
//! - Party scope changes (so the host can persist them)

use crate::types::{PartyScope, PlaybackStatus};
use lark_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// A new track was bound to the backend
    CurrentChanged {
        /// ID of the new current track
        track_id: TrackId,
    },

    /// The transport state may have changed
    PlaybackStatusChanged {
        /// Backend state at emission time
        status: PlaybackStatus,
    },

    /// The user playlist changed
    PlaylistChanged {
        /// New playlist length
        length: usize,
    },

    /// The party scope was replaced
    PartyScopeChanged {
        /// The new scope
        scope: PartyScope,
    },
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&PlayerEvent) + Send>;

/// Ordered list of event subscribers
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber; it sees every event emitted from now on
    pub fn subscribe<F>(&mut self, subscriber: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Deliver an event to all subscribers, in subscription order
    pub fn emit(&mut self, event: &PlayerEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
