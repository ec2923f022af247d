//! Lark Collection Scanner
//!
//! Fills the catalog from the music directory.
//!
//! # Architecture
//!
//! - `scanner`: Filesystem walk for audio files
//! - `metadata`: Tag reading with fallbacks for missing fields
//! - `collection`: Synchronization of the catalog with the files on disk

mod error;

pub mod collection;
pub mod metadata;
pub mod scanner;

pub use collection::{CollectionScanner, ScanFailure, ScanReport};
pub use error::ImportError;
pub use metadata::{read_track_tags, TrackTags};
pub use scanner::FileScanner;

pub type Result<T> = std::result::Result<T, ImportError>;
