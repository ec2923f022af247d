//! Whole-catalog maintenance

use lark_core::error::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Rows removed by [`clean_orphans`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanCounts {
    pub albums: u64,
    pub artists: u64,
    pub genres: u64,
}

/// Delete albums without tracks, then artists and genres without albums
pub async fn clean_orphans(pool: &SqlitePool) -> Result<OrphanCounts> {
    let albums = sqlx::query(
        "DELETE FROM albums
         WHERE NOT EXISTS (SELECT 1 FROM tracks WHERE tracks.album_id = albums.id)",
    )
    .execute(pool)
    .await?
    .rows_affected();

    let artists = sqlx::query(
        "DELETE FROM artists
         WHERE NOT EXISTS (SELECT 1 FROM albums WHERE albums.artist_id = artists.id)",
    )
    .execute(pool)
    .await?
    .rows_affected();

    let genres = sqlx::query(
        "DELETE FROM genres
         WHERE NOT EXISTS (SELECT 1 FROM albums WHERE albums.genre_id = genres.id)",
    )
    .execute(pool)
    .await?
    .rows_affected();

    Ok(OrphanCounts {
        albums,
        artists,
        genres,
    })
}

/// Drop the whole catalog; settings are kept
pub async fn reset(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    for table in ["tracks", "albums", "artists", "genres"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}
