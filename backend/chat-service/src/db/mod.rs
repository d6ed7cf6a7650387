//! Data access layer. Every repository function takes any SQLite executor,
//! so services can run them on the pool or inside a transaction.

pub mod conversation_repo;
pub mod message_repo;
pub mod participant_repo;
pub mod user_repo;

use sqlx::SqlitePool;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// True when the error comes from a UNIQUE constraint
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
