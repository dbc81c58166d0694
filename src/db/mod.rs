//! Database plumbing: connection pool, embedded migrations and store selection.

mod migrations;
mod pool;

pub use migrations::{MIGRATIONS, pending_migrations, revert_migrations, run_migrations};
pub use pool::{AsyncDbPool, connect_store, establish_async_connection_pool};
