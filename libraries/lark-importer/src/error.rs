//! Error types for the importer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] lark_core::LarkError),

    #[error("Storage layer error: {0}")]
    StorageLayer(#[from] lark_storage::StorageError),

    #[error("Metadata error: {0}")]
    Metadata(String),

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Scan worker stopped before reporting")]
    Cancelled,
}
