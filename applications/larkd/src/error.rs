/// Daemon error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DaemonError>;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Storage error: {0}")]
    Storage(#[from] lark_core::LarkError),

    #[error("Storage layer error: {0}")]
    StorageLayer(#[from] lark_storage::StorageError),

    #[error("Playback error: {0}")]
    Playback(#[from] lark_playback::PlaybackError),

    #[error("Scan error: {0}")]
    Import(#[from] lark_importer::ImportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
