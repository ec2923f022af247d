use lark_core::{error::Result, Genre, GenreId, LarkError};
use sqlx::{Row, SqlitePool};

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Genre>> {
    let rows = sqlx::query("SELECT id, name FROM genres ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| Genre {
            id: row.get("id"),
            name: row.get("name"),
        })
        .collect())
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<GenreId>> {
    let row = sqlx::query("SELECT id FROM genres WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| row.get("id")))
}

/// Id of the genre called `name`, inserting it if needed
pub async fn get_or_create(pool: &SqlitePool, name: &str) -> Result<GenreId> {
    sqlx::query("INSERT OR IGNORE INTO genres (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    find_by_name(pool, name)
        .await?
        .ok_or_else(|| LarkError::storage(format!("Failed to retrieve genre {}", name)))
}
