//! Report repository.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::AppResult;
use crate::models::{Report, ReportStatus};
use crate::repositories::base::delegate_repository;
use crate::repositories::{BaseRepository, Entity, Repository, StoreContext, UnitOfWork};
use crate::store::{EntityKind, Record, ReportQuery};

impl Entity for Report {
    type Query = ReportQuery;

    const KIND: EntityKind = EntityKind::Report;

    fn query_all() -> ReportQuery {
        ReportQuery::All
    }

    fn query_by_id(id: i32) -> ReportQuery {
        ReportQuery::Id(id)
    }

    fn into_record(self) -> Record {
        Record::Report(self)
    }

    fn fetch<'a>(
        context: &'a StoreContext,
        query: &'a ReportQuery,
    ) -> BoxFuture<'a, AppResult<Vec<Self>>> {
        context.select_reports(query).boxed()
    }

    fn specialized_repository(uow: &UnitOfWork) -> Option<Arc<dyn Repository<Self>>> {
        Some(uow.reports())
    }
}

/// Report repository. Loaded reports carry their indicators.
pub struct ReportRepository {
    base: Arc<BaseRepository<Report>>,
}

impl ReportRepository {
    pub fn new(base: Arc<BaseRepository<Report>>) -> Self {
        Self { base }
    }

    pub async fn get_reports_by_employee_id(&self, employee_id: i32) -> AppResult<Vec<Report>> {
        self.base.fetch(&ReportQuery::EmployeeId(employee_id)).await
    }

    pub async fn get_by_status(&self, status: ReportStatus) -> AppResult<Vec<Report>> {
        self.base.fetch(&ReportQuery::Status(status)).await
    }

    /// The report currently holding the indicator, if any.
    pub async fn get_by_indicator_id(&self, indicator_id: i32) -> AppResult<Option<Report>> {
        let holder = |report: &Report| report.find_indicator(indicator_id).is_some();
        let rows = self.base.find(&holder, 0, 1).await?;
        Ok(rows.into_iter().next())
    }
}

delegate_repository!(ReportRepository, Report);
