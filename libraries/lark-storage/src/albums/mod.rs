use lark_core::{error::Result, Album, AlbumId, ArtistId, GenreId, LarkError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

fn album_from_row(row: &SqliteRow) -> Album {
    Album {
        id: row.get("id"),
        name: row.get("name"),
        artist_id: row.get("artist_id"),
        genre_id: row.get("genre_id"),
        popularity: row.get("popularity"),
    }
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Album>> {
    let rows = sqlx::query(
        "SELECT id, name, artist_id, genre_id, popularity
         FROM albums
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(album_from_row).collect())
}

pub async fn get_by_id(pool: &SqlitePool, id: AlbumId) -> Result<Option<Album>> {
    let row = sqlx::query(
        "SELECT id, name, artist_id, genre_id, popularity
         FROM albums
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(album_from_row))
}

pub async fn find(
    pool: &SqlitePool,
    name: &str,
    artist_id: ArtistId,
    genre_id: GenreId,
) -> Result<Option<AlbumId>> {
    let row = sqlx::query("SELECT id FROM albums WHERE name = ? AND artist_id = ? AND genre_id = ?")
        .bind(name)
        .bind(artist_id)
        .bind(genre_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| row.get("id")))
}

/// Id of the album (name, artist, genre), inserting it if needed
pub async fn get_or_create(
    pool: &SqlitePool,
    name: &str,
    artist_id: ArtistId,
    genre_id: GenreId,
) -> Result<AlbumId> {
    sqlx::query("INSERT OR IGNORE INTO albums (name, artist_id, genre_id) VALUES (?, ?, ?)")
        .bind(name)
        .bind(artist_id)
        .bind(genre_id)
        .execute(pool)
        .await?;

    find(pool, name, artist_id, genre_id)
        .await?
        .ok_or_else(|| LarkError::storage(format!("Failed to retrieve album {}", name)))
}

/// Albums filed under a genre, grouped by artist
pub async fn get_by_genre(pool: &SqlitePool, genre_id: GenreId) -> Result<Vec<AlbumId>> {
    let rows = sqlx::query("SELECT id FROM albums WHERE genre_id = ? ORDER BY artist_id, id")
        .bind(genre_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|row| row.get("id")).collect())
}

/// Add `by` to an album's popularity counter
pub async fn increment_popularity(pool: &SqlitePool, album_id: AlbumId, by: i64) -> Result<()> {
    let result = sqlx::query("UPDATE albums SET popularity = popularity + ? WHERE id = ?")
        .bind(by)
        .bind(album_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(LarkError::not_found("Album", album_id));
    }
    Ok(())
}

/// Albums picked at least once, by ascending popularity
pub async fn popular(pool: &SqlitePool, limit: usize) -> Result<Vec<AlbumId>> {
    let rows = sqlx::query(
        "SELECT id FROM albums
         WHERE popularity != 0
         ORDER BY popularity ASC, id
         LIMIT ?",
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("id")).collect())
}
