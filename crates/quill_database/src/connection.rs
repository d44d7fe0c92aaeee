//! Database connection utilities.

use crate::DatabaseResult;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use quill_error::{DatabaseError, DatabaseErrorKind};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Connection pool shared by a story store.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Read `DATABASE_URL` from the environment.
///
/// # Errors
///
/// Returns an error if the variable is not set.
pub fn database_url() -> DatabaseResult<String> {
    std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })
}

/// Establish a single connection to the PostgreSQL database.
///
/// Reads the `DATABASE_URL` environment variable to determine the connection string.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
pub fn establish_connection() -> DatabaseResult<PgConnection> {
    let url = database_url()?;
    PgConnection::establish(&url)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))
}

/// Build a connection pool and check out one connection to prove it works.
///
/// # Errors
///
/// Returns an error if the pool cannot be built or the first connection fails.
pub fn create_pool(url: &str, max_size: u32) -> DatabaseResult<PgPool> {
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| {
            DatabaseError::new(DatabaseErrorKind::Connection(format!(
                "Failed to create connection pool: {}",
                e
            )))
        })?;
    Ok(pool)
}

/// Run pending migrations.
///
/// # Errors
///
/// Returns an error if any migration fails to apply.
pub fn run_migrations(conn: &mut PgConnection) -> DatabaseResult<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| {
            if !applied.is_empty() {
                tracing::info!(count = applied.len(), "Applied database migrations");
            }
        })
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Migration(e.to_string())))
}
