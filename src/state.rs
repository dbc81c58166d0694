//! Application state for Axum web framework.
//!
//! Holds the store and the settings handlers need. Services are not shared
//! across requests: every request opens its own unit of work through
//! [`AppState::with_services`].

use std::future::Future;
use std::sync::Arc;

use crate::config::JwtConfig;
use crate::error::AppResult;
use crate::services::Services;
use crate::store::Store;

/// Cloning is cheap since the store sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// JWT configuration for bearer token validation
    pub jwt_config: JwtConfig,
    pub employee_page_size: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, jwt_config: JwtConfig, employee_page_size: usize) -> Self {
        Self {
            store,
            jwt_config,
            employee_page_size,
        }
    }

    /// Runs `operation` against a fresh set of services and releases their
    /// session afterwards, whether the operation succeeded or not.
    ///
    /// # Example
    /// ```ignore
    /// let employee = state
    ///     .with_services(|s| async move { s.employees.get_by_id(id).await })
    ///     .await?;
    /// ```
    pub async fn with_services<T, F, Fut>(&self, operation: F) -> AppResult<T>
    where
        F: FnOnce(Services) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let services = Services::begin(self.store.as_ref(), self.employee_page_size).await?;
        let result = operation(services.clone()).await;
        services.finish().await;
        result
    }
}
