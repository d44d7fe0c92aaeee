//! PostgreSQL story store for Quill.
//!
//! This crate provides the Diesel schema, row models and the
//! [`PostgresStoryStore`] implementation of
//! [`StoryStore`](quill_interface::StoryStore).
//!
//! Every write is an individual row-level upsert keyed by the entity's
//! natural key; nothing spans a multi-row transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_database::PostgresStoryStore;
//! use quill_interface::StoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = PostgresStoryStore::from_env()?;
//! let resumed = store.latest_written_location().await?;
//! # Ok(())
//! # }
//! ```

mod connection;
mod conversions;
mod models;
mod store;

pub mod schema;

pub use connection::{PgPool, create_pool, database_url, establish_connection, run_migrations};
pub use store::PostgresStoryStore;

use quill_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
