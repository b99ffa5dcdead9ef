use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Schema statements, applied in order. Every statement is idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS resumes (
        id          BLOB PRIMARY KEY NOT NULL,
        name        TEXT NOT NULL,
        content     TEXT NOT NULL,
        source      TEXT NOT NULL,
        is_selected BOOLEAN NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    )
    "#,
    // At most one selected resume, enforced by the store itself.
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS resumes_single_selected
        ON resumes (is_selected) WHERE is_selected = 1
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id                   BLOB PRIMARY KEY NOT NULL,
        created_at           TEXT NOT NULL,
        updated_at           TEXT NOT NULL,
        company              TEXT NOT NULL,
        title                TEXT NOT NULL,
        source_url           TEXT,
        original_description TEXT NOT NULL,
        resume_id            BLOB,
        match_score          INTEGER,
        resume_html          TEXT,
        cover_letter_html    TEXT,
        document_format      TEXT,
        is_edited            BOOLEAN NOT NULL DEFAULT 0,
        applied              BOOLEAN NOT NULL DEFAULT 0,
        revision             INTEGER NOT NULL DEFAULT 0,
        CHECK ((match_score IS NULL) = (resume_html IS NULL)
           AND (resume_html IS NULL) = (cover_letter_html IS NULL))
    )
    "#,
];

/// Creates and returns a SQLite connection pool, creating the database file if missing.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite database at {database_url}...");

    // Writers that find the database locked wait up to BUSY_TIMEOUT for it.
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates the `resumes` and `jobs` tables if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Single-connection in-memory pool with the schema applied.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    init_schema(&pool).await.unwrap();
    pool
}
