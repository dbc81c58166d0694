//! Async connection pool on bb8 + diesel-async.

use std::sync::Arc;
use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::Pool;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::error::{AppError, AppResult};
use crate::store::{MemoryStore, PgStore, Store};

/// bb8 pools are reference counted, so cloning is cheap.
pub type AsyncDbPool = Pool<AsyncPgConnection>;

/// Builds a PostgreSQL pool sized and timed by `config`.
pub async fn establish_async_connection_pool(config: &DatabaseConfig) -> AppResult<AsyncDbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.url.as_str());
    Pool::builder()
        .max_size(config.max_connections)
        .min_idle(Some(config.min_connections))
        .connection_timeout(Duration::from_secs(config.connection_timeout))
        .build(manager)
        .await
        .map_err(|e| AppError::ConnectionPool {
            source: anyhow::Error::msg(e.to_string()),
        })
}

/// Opens the store selected by `database.backend`.
pub async fn connect_store(config: &DatabaseConfig) -> AppResult<Arc<dyn Store>> {
    let store: Arc<dyn Store> = match config.backend {
        StoreBackend::Postgres => {
            let pool = establish_async_connection_pool(config).await?;
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store, data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!(backend = store.backend(), "Store ready");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_needs_no_database() {
        let config = DatabaseConfig {
            backend: StoreBackend::Memory,
            ..DatabaseConfig::default()
        };
        let store = connect_store(&config).await.unwrap();
        assert_eq!(store.backend(), "memory");
        assert!(store.ping().await.is_ok());
    }
}
