//! Database initialization
//!
//! Creates the account tables and the unique indexes whose violations the
//! exception converter knows how to attribute.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// How long a connection waits on a locked database
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open (creating if needed) the account database at `db_path`
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Pragmas are per connection, so they go on the connect options
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory account database
///
/// Limited to one long-lived connection: every SQLite memory connection is
/// its own database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_accounts_table(pool).await?;
    create_enrollments_table(pool).await?;

    Ok(())
}

async fn create_accounts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            app_id TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            phone_region TEXT,
            synapse_user_id TEXT,
            version INTEGER NOT NULL DEFAULT 1,
            created_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            modified_on TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // NULLs never collide in SQLite unique indexes, so absent values are fine
    for (index, column) in [
        ("accounts_app_id_email_idx", "email"),
        ("accounts_app_id_phone_idx", "phone"),
        ("accounts_app_id_synapse_user_id_idx", "synapse_user_id"),
    ] {
        let sql = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {} ON accounts (app_id, {})",
            index, column
        );
        sqlx::query(&sql).execute(pool).await?;
    }

    Ok(())
}

async fn create_enrollments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS enrollments (
            app_id TEXT NOT NULL,
            study_id TEXT NOT NULL,
            account_id TEXT NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
            external_id TEXT,
            enrollment_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (study_id, account_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS enrollments_app_id_study_id_external_id_idx \
         ON enrollments (app_id, study_id, external_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
