//! Error types for the playback engine

use thiserror::Error;

/// Playback errors
///
/// Catalog misses and navigation at a boundary are not errors; they degrade
/// to defaults or no-ops. Only the audio backend can fail an operation.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio backend rejected a URI or a transport change
    #[error("Audio backend error: {0}")]
    Backend(String),

    /// A remote-control command could not be parsed
    #[error("Invalid remote command: {0}")]
    InvalidCommand(String),

    /// Party scope text could not be parsed
    #[error("Invalid party scope: {0}")]
    InvalidPartyScope(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
