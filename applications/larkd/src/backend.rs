//! Clock-driven audio backend
//!
//! Decoding and output are outside the daemon; `ClockBackend` keeps the
//! transport state and a playback clock per stream, and reports end of
//! stream when the clock reaches the track length. Every arm or disarm of
//! the end-of-stream timer bumps a generation counter so the dispatch loop
//! can drop notifications that were already in flight.

use crate::event::DaemonEvent;
use lark_core::{AudioBackend, BackendState, LarkError, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

pub struct ClockBackend {
    events: UnboundedSender<DaemonEvent>,
    generation: Arc<AtomicU64>,
    uri: Option<String>,
    length: Duration,
    state: BackendState,
    /// Position accumulated before the last resume
    offset: Duration,
    /// Set while playing
    resumed_at: Option<Instant>,
    end_of_stream: Option<JoinHandle<()>>,
}

impl ClockBackend {
    pub fn new(events: UnboundedSender<DaemonEvent>) -> Self {
        Self {
            events,
            generation: Arc::new(AtomicU64::new(0)),
            uri: None,
            length: Duration::ZERO,
            state: BackendState::Stopped,
            offset: Duration::ZERO,
            resumed_at: None,
            end_of_stream: None,
        }
    }

    /// Shared counter identifying the live end-of-stream timer
    pub fn generation(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.generation)
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    fn elapsed(&self) -> Duration {
        let running = self.resumed_at.map_or(Duration::ZERO, |at| at.elapsed());
        (self.offset + running).min(self.length)
    }

    fn disarm(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.end_of_stream.take() {
            task.abort();
        }
    }

    fn arm(&mut self) {
        self.disarm();
        let generation = self.generation.load(Ordering::SeqCst);
        let remaining = self.length.saturating_sub(self.offset);
        let events = self.events.clone();

        self.end_of_stream = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            // The loop may already be gone during shutdown
            let _ = events.send(DaemonEvent::EndOfStream { generation });
        }));
    }
}

impl AudioBackend for ClockBackend {
    fn set_uri(&mut self, uri: &str, length: Duration) -> Result<()> {
        if uri.is_empty() {
            return Err(LarkError::backend("empty stream uri"));
        }
        self.disarm();
        debug!(uri, ?length, "Stream bound");
        self.uri = Some(uri.to_string());
        self.length = length;
        self.offset = Duration::ZERO;
        self.resumed_at = None;
        self.state = BackendState::Stopped;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.uri.is_none() {
            return Err(LarkError::backend("no stream bound"));
        }
        if self.state != BackendState::Playing {
            self.resumed_at = Some(Instant::now());
            self.state = BackendState::Playing;
            self.arm();
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.state == BackendState::Playing {
            self.offset = self.elapsed();
            self.resumed_at = None;
            self.disarm();
        }
        if self.uri.is_some() {
            self.state = BackendState::Paused;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.disarm();
        self.offset = Duration::ZERO;
        self.resumed_at = None;
        self.state = BackendState::Stopped;
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        if self.uri.is_none() {
            return Err(LarkError::backend("no stream bound"));
        }
        self.offset = position.min(self.length);
        if self.state == BackendState::Playing {
            self.resumed_at = Some(Instant::now());
            self.arm();
        }
        Ok(())
    }

    fn state(&self) -> BackendState {
        self.state
    }

    fn position(&self) -> Option<Duration> {
        self.uri.as_ref().map(|_| self.elapsed())
    }
}

impl Drop for ClockBackend {
    fn drop(&mut self) {
        if let Some(task) = self.end_of_stream.take() {
            task.abort();
        }
    }
}
