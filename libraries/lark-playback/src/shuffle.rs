//! Random candidate selection for shuffle and party advancement
//!
//! Walks a freshly shuffled snapshot of the context's albums, and for each
//! a freshly shuffled snapshot of its tracks, returning the first track not
//! yet played. Nothing is cached between calls and the context itself is
//! never modified: an album exhausted here is only skipped for this call.

use lark_core::{AlbumId, LibraryStore, TrackId};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Pick an unplayed track from `albums`, or `None` if every track was played
pub fn pick_candidate<R>(
    rng: &mut R,
    store: &dyn LibraryStore,
    albums: &[AlbumId],
    played: &HashSet<TrackId>,
) -> Option<TrackId>
where
    R: Rng + ?Sized,
{
    let mut album_order = albums.to_vec();
    album_order.shuffle(rng);

    for album_id in album_order {
        let mut tracks = store.track_ids_by_album(album_id);
        tracks.shuffle(rng);

        if let Some(track_id) = tracks.into_iter().find(|id| !played.contains(id)) {
            return Some(track_id);
        }
    }

    None
}
