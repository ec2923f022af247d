//! Catalog entities
//!
//! The catalog is owned by the library store; the playback engine only holds
//! identifiers and read-only snapshots of these types.

mod album;
mod artist;
mod genre;
mod track;

pub use album::{Album, AlbumId};
pub use artist::{Artist, ArtistId};
pub use genre::{Genre, GenreId};
pub use track::{Track, TrackId};

/// Display name used when a tag or catalog row is missing
pub const UNKNOWN: &str = "Unknown";
