//! Service layer for business logic operations.
//!
//! Each service holds the unit of work of the current operation, performs
//! the reads needed to check existence rules, stages one mutation and
//! commits once.

mod employee_service;
mod indicator_service;
mod report_service;

pub use employee_service::EmployeeService;
pub use indicator_service::IndicatorService;
pub use report_service::ReportService;

use std::sync::Arc;

use crate::error::AppResult;
use crate::repositories::UnitOfWork;
use crate::store::Store;

/// The services of one logical operation, sharing a single unit of work.
#[derive(Clone)]
pub struct Services {
    pub employees: EmployeeService,
    pub indicators: IndicatorService,
    pub reports: ReportService,
    uow: Arc<UnitOfWork>,
}

impl Services {
    /// Builds the services around an existing unit of work.
    ///
    /// # Arguments
    /// * `uow` - Unit of work for this operation
    /// * `employee_page_size` - Page size for the administrator employee listing
    pub fn new(uow: Arc<UnitOfWork>, employee_page_size: usize) -> Self {
        Self {
            employees: EmployeeService::new(Arc::clone(&uow), employee_page_size),
            indicators: IndicatorService::new(Arc::clone(&uow)),
            reports: ReportService::new(Arc::clone(&uow)),
            uow,
        }
    }

    /// Opens a unit of work on `store` and builds the services around it.
    pub async fn begin(store: &dyn Store, employee_page_size: usize) -> AppResult<Self> {
        let uow = UnitOfWork::begin(store).await?;
        Ok(Self::new(Arc::new(uow), employee_page_size))
    }

    /// Releases the underlying store session.
    pub async fn finish(&self) {
        self.uow.dispose().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::store::MemoryStore;
    use crate::store::fixtures::employee;

    #[tokio::test]
    async fn services_share_one_session() {
        let store = MemoryStore::new();
        let services = Services::begin(&store, 10).await.unwrap();
        assert_eq!(store.open_sessions(), 1);

        services
            .employees
            .create(employee(1, Role::Staff).into())
            .await
            .unwrap();
        assert_eq!(services.employees.get_all().await.unwrap().len(), 1);

        services.finish().await;
        assert_eq!(store.open_sessions(), 0);
        assert!(services.indicators.get_all().await.is_err());
    }
}
