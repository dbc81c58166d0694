//! Employee repository.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::AppResult;
use crate::models::{Employee, Role};
use crate::repositories::base::delegate_repository;
use crate::repositories::{BaseRepository, Entity, Repository, StoreContext, UnitOfWork};
use crate::store::{EmployeeQuery, EntityKind, Record};

impl Entity for Employee {
    type Query = EmployeeQuery;

    const KIND: EntityKind = EntityKind::Employee;

    fn query_all() -> EmployeeQuery {
        EmployeeQuery::All
    }

    fn query_by_id(id: i32) -> EmployeeQuery {
        EmployeeQuery::Id(id)
    }

    fn into_record(self) -> Record {
        Record::Employee(self)
    }

    fn fetch<'a>(
        context: &'a StoreContext,
        query: &'a EmployeeQuery,
    ) -> BoxFuture<'a, AppResult<Vec<Self>>> {
        context.select_employees(query).boxed()
    }

    fn specialized_repository(uow: &UnitOfWork) -> Option<Arc<dyn Repository<Self>>> {
        Some(uow.employees())
    }
}

/// Employee repository: generic CRUD plus role and email lookups.
pub struct EmployeeRepository {
    base: Arc<BaseRepository<Employee>>,
}

impl EmployeeRepository {
    pub fn new(base: Arc<BaseRepository<Employee>>) -> Self {
        Self { base }
    }

    /// Employees holding `role`.
    pub async fn search_by_role(&self, role: Role) -> AppResult<Vec<Employee>> {
        self.base.fetch(&EmployeeQuery::Role(role)).await
    }

    /// First employee whose email matches exactly.
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        let rows = self
            .base
            .fetch(&EmployeeQuery::Email(email.to_string()))
            .await?;
        Ok(rows.into_iter().next())
    }
}

delegate_repository!(EmployeeRepository, Employee);
