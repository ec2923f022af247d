//! Persistent settings
//!
//! Key-value pairs with JSON-serialized values.
//!
//! # Example
//!
//! ```rust,no_run
//! use lark_storage::settings;
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! settings::set_setting(pool, settings::SETTING_PARTY_SCOPE, &serde_json::json!(["popular"])).await?;
//!
//! let scope = settings::get_setting(pool, settings::SETTING_PARTY_SCOPE).await?;
//! # Ok(())
//! # }
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;

// Setting key constants
/// Genres (and sentinels) eligible in party mode
pub const SETTING_PARTY_SCOPE: &str = "party.scope";

/// Whether shuffle was on when the daemon last exited
pub const SETTING_SHUFFLE: &str = "playback.shuffle";

/// Get a single setting value
///
/// Returns `Ok(None)` if the key was never set.
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<serde_json::Value>> {
    let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let raw: String = row.get("value");
            let value = serde_json::from_str(&raw)
                .map_err(|e| StorageError::SerializationError(e.to_string()))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Set (insert or replace) a setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &serde_json::Value) -> Result<()> {
    let raw = serde_json::to_string(value)
        .map_err(|e| StorageError::SerializationError(e.to_string()))?;

    sqlx::query(
        "INSERT INTO settings (key, value, updated_at)
         VALUES (?, ?, strftime('%s', 'now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(raw)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_setting(pool: &SqlitePool, key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Typed read of a setting
pub async fn get_typed<T: DeserializeOwned>(pool: &SqlitePool, key: &str) -> Result<Option<T>> {
    match get_setting(pool, key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StorageError::SerializationError(e.to_string())),
        None => Ok(None),
    }
}

/// Typed write of a setting
pub async fn set_typed<T: Serialize>(pool: &SqlitePool, key: &str, value: &T) -> Result<()> {
    let value =
        serde_json::to_value(value).map_err(|e| StorageError::SerializationError(e.to_string()))?;
    set_setting(pool, key, &value).await
}
