use lark_core::{error::Result, AlbumId, LarkError, Track, TrackId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::path::{Path, PathBuf};

/// Data for inserting a scanned track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrack {
    pub name: String,
    pub path: PathBuf,
    pub duration_secs: u32,
    pub track_number: u32,
    pub year: Option<String>,
    pub album_id: AlbumId,
}

fn track_from_row(row: &SqliteRow) -> Track {
    let path: String = row.get("filepath");
    Track {
        id: row.get("id"),
        name: row.get("name"),
        path: PathBuf::from(path),
        duration_secs: u32::try_from(row.get::<i64, _>("length")).unwrap_or(0),
        track_number: u32::try_from(row.get::<i64, _>("tracknumber")).unwrap_or(0),
        year: row.get("year"),
        album_id: row.get("album_id"),
    }
}

pub async fn insert(pool: &SqlitePool, track: &NewTrack) -> Result<TrackId> {
    let result = sqlx::query(
        "INSERT INTO tracks (name, filepath, length, tracknumber, year, album_id)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(track.name.as_str())
    .bind(track.path.to_string_lossy().into_owned())
    .bind(i64::from(track.duration_secs))
    .bind(i64::from(track.track_number))
    .bind(track.year.as_deref())
    .bind(track.album_id)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn get_by_id(pool: &SqlitePool, id: TrackId) -> Result<Track> {
    let row = sqlx::query(
        "SELECT id, name, filepath, length, tracknumber, year, album_id
         FROM tracks
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref()
        .map(track_from_row)
        .ok_or_else(|| LarkError::not_found("Track", id))
}

/// Every track, grouped by album in track-number order
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Track>> {
    let rows = sqlx::query(
        "SELECT id, name, filepath, length, tracknumber, year, album_id
         FROM tracks
         ORDER BY album_id, tracknumber, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(track_from_row).collect())
}

/// File paths of every known track
pub async fn all_paths(pool: &SqlitePool) -> Result<Vec<PathBuf>> {
    let rows = sqlx::query("SELECT filepath FROM tracks")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| PathBuf::from(row.get::<String, _>("filepath")))
        .collect())
}

pub async fn remove_by_path(pool: &SqlitePool, path: &Path) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tracks WHERE filepath = ?")
        .bind(path.to_string_lossy().into_owned())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Tracks whose title, album or artist contains `text` (case-insensitive)
pub async fn search(pool: &SqlitePool, text: &str, limit: usize) -> Result<Vec<Track>> {
    let pattern = format!("%{}%", text.trim());
    let rows = sqlx::query(
        "SELECT t.id, t.name, t.filepath, t.length, t.tracknumber, t.year, t.album_id
         FROM tracks t
         INNER JOIN albums al ON al.id = t.album_id
         INNER JOIN artists ar ON ar.id = al.artist_id
         WHERE t.name LIKE ?1 OR al.name LIKE ?1 OR ar.name LIKE ?1
         ORDER BY ar.name, al.name, t.tracknumber
         LIMIT ?2",
    )
    .bind(pattern)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(track_from_row).collect())
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM tracks")
        .fetch_one(pool)
        .await?;
    Ok(row.get("count"))
}
