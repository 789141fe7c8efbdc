//! Embedded schema migrations.

use sqlx::SqlitePool;

/// Run all embedded migrations against the given pool.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
