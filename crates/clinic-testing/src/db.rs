//! In-memory SQLite database with the outreach schema applied.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use clinic_outreach_migration::Migrator;

/// Connect to a fresh in-memory SQLite database and run all migrations.
///
/// The pool is capped at one connection: every in-memory SQLite connection is
/// its own database.
pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("failed to open in-memory sqlite");
    Migrator::up(&db, None)
        .await
        .expect("failed to run migrations");
    db
}
