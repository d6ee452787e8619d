//! Database migration runner for Obra.
//!
//! Reads `DATABASE_URL` and accepts the `sea-orm-migration` subcommands:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Revert the last migration
//!   migrator status  - List applied and pending migrations
//!   migrator fresh   - Drop every table and migrate from scratch

use obra_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The CLI installs its own tracing subscriber.
    cli::run_cli(Migrator).await;
}
