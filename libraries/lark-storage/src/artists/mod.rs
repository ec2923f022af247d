use lark_core::{error::Result, Artist, ArtistId, LarkError};
use sqlx::{Row, SqlitePool};

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let rows = sqlx::query("SELECT id, name FROM artists ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| Artist {
            id: row.get("id"),
            name: row.get("name"),
        })
        .collect())
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<ArtistId>> {
    let row = sqlx::query("SELECT id FROM artists WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| row.get("id")))
}

/// Id of the artist called `name`, inserting it if needed
pub async fn get_or_create(pool: &SqlitePool, name: &str) -> Result<ArtistId> {
    sqlx::query("INSERT OR IGNORE INTO artists (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    find_by_name(pool, name)
        .await?
        .ok_or_else(|| LarkError::storage(format!("Failed to retrieve artist {}", name)))
}
