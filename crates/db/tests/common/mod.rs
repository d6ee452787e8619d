//! Shared setup for database integration tests.
//!
//! Tests need a PostgreSQL database in `DATABASE_URL`; without one they return
//! early and pass.

#![allow(dead_code)]

use obra_db::migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tokio::sync::OnceCell;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connects to the test database and applies pending migrations once.
pub async fn setup() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");

    MIGRATED
        .get_or_try_init(|| async { Migrator::up(&db, None).await })
        .await
        .expect("Failed to run migrations");

    Some(db)
}
