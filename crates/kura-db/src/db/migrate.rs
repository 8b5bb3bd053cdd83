use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{DbError, DbResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// ## Summary
/// Runs pending diesel migrations against `database_url`.
///
/// Migrations use a blocking connection, so they run on the blocking pool.
///
/// ## Errors
/// Returns an error if the connection cannot be established or a migration fails.
#[tracing::instrument(skip(database_url))]
pub async fn run_migrations(database_url: &str) -> DbResult<()> {
    let url = database_url.to_string();

    tokio::task::spawn_blocking(move || {
        let mut conn = diesel::PgConnection::establish(&url)
            .map_err(|e| DbError::MigrationError(e.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::MigrationError(e.to_string()))?;
        tracing::info!(applied = applied.len(), "Migrations applied");
        Ok::<_, DbError>(())
    })
    .await
    .map_err(|e| DbError::MigrationError(e.to_string()))?
}
