//! Lark Core
//!
//! Catalog types, collaborator contracts, and error handling shared by every
//! Lark crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Album`, `Artist`, `Genre` and their ids
//! - **Contracts**: `LibraryStore` (catalog queries) and `AudioBackend`
//!   (single-track output primitive)
//! - **Error Handling**: Unified `LarkError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use lark_core::types::{Album, Track};
//! use std::path::PathBuf;
//!
//! let album = Album::new(1, "Blue Train", 1, 1);
//! let track = Track::new(10, "Moment's Notice", PathBuf::from("/music/moment.flac"), album.id)
//!     .with_track_number(2)
//!     .with_duration_secs(551);
//!
//! assert_eq!(track.duration().as_secs(), 551);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LarkError, Result};
pub use traits::{AudioBackend, BackendState, LibraryStore};

pub use types::{
    Album, AlbumId, Artist, ArtistId, Genre, GenreId, Track, TrackId, UNKNOWN,
};
