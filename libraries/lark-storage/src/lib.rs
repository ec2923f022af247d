//! Lark Storage
//!
//! `SQLite` catalog for the Lark music daemon: genres, artists, albums and
//! tracks filled by the collection scanner, plus key-value settings.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each entity owns its own queries
//! - **Snapshot reads**: [`Catalog`] loads the library into memory and serves
//!   the playback engine's synchronous [`lark_core::LibraryStore`] queries
//! - **Write-behind popularity**: album popularity bumps are journaled by the
//!   catalog and flushed back to the database
//!
//! # Example
//!
//! ```rust,no_run
//! use lark_storage::{create_pool, run_migrations, Catalog};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://lark.db").await?;
//! run_migrations(&pool).await?;
//!
//! let catalog = Catalog::load(&pool).await?;
//! println!("{} tracks", catalog.track_count());
//! # Ok(())
//! # }
//! ```

mod catalog;
mod error;

// Vertical slices
pub mod albums;
pub mod artists;
pub mod genres;
pub mod tracks;

// Maintenance and preferences
pub mod library;
pub mod settings;

pub use catalog::Catalog;
pub use error::{Result, StorageError};

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// The database file is created if missing.
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    debug!(url = database_url, "Creating pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    debug!("Pool created");
    Ok(pool)
}
