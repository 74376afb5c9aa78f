//! Database pool construction and migration runner.
//!
//! Migrations are embedded at compile time and applied before the router
//! starts serving, so handlers never observe a half-migrated schema.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Resolve the pool size from a raw `DB_MAX_CONNECTIONS` value.
/// Absent, empty, or unparseable input falls back to the default.
#[must_use]
pub fn parse_max_connections(raw: Option<&str>) -> u32 {
    raw.and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_MAX_CONNECTIONS)
}

/// Build the `PostgreSQL` connection pool and run embedded migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
