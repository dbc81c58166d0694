//! PostgreSQL store on diesel-async.
//!
//! Each session owns one pooled connection for its whole lifetime. Change
//! sets run inside a single database transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::{avg, max};
use diesel::prelude::*;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Employee, Indicator, IndicatorRow, IndicatorType, Report, ReportRow};
use crate::schema::{employees, indicators, reports};
use crate::store::{
    Aggregate, Change, ChangeSet, EmployeeQuery, EntityKind, IndicatorQuery, Record, ReportQuery,
    Store, StoreSession,
};

type OwnedConnection =
    bb8::PooledConnection<'static, AsyncDieselConnectionManager<AsyncPgConnection>>;

/// PostgreSQL-backed [`Store`].
///
/// `AsyncDbPool` is reference counted, so cloning the store is cheap.
#[derive(Clone)]
pub struct PgStore {
    pool: AsyncDbPool,
}

impl PgStore {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn open_session(&self) -> AppResult<Box<dyn StoreSession>> {
        let conn = self.pool.get_owned().await?;
        Ok(Box::new(PgSession { conn }))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}

pub struct PgSession {
    conn: OwnedConnection,
}

#[async_trait]
impl StoreSession for PgSession {
    async fn select_employees(&mut self, query: &EmployeeQuery) -> AppResult<Vec<Employee>> {
        let mut select = employees::table.into_boxed();
        select = match query {
            EmployeeQuery::All => select,
            EmployeeQuery::Id(id) => select.filter(employees::id.eq(*id)),
            EmployeeQuery::Role(role) => select.filter(employees::role.eq(*role)),
            EmployeeQuery::Email(email) => select.filter(employees::email.eq(email.clone())),
        };

        select
            .order(employees::id.asc())
            .select(Employee::as_select())
            .load(&mut self.conn)
            .await
            .map_err(AppError::from)
    }

    async fn select_indicators(&mut self, query: &IndicatorQuery) -> AppResult<Vec<Indicator>> {
        let mut select = indicators::table.into_boxed();
        select = match query {
            IndicatorQuery::All => select,
            IndicatorQuery::Id(id) => select.filter(indicators::id.eq(*id)),
            IndicatorQuery::Type(t) => select.filter(indicators::indicator_type.eq(*t)),
            IndicatorQuery::DateRange { start, end } => select
                .filter(indicators::collected_at.ge(start.to_diesel()))
                .filter(indicators::collected_at.le(end.to_diesel())),
            IndicatorQuery::AboveValue(min) => select.filter(indicators::value.ge(*min)),
        };

        let rows: Vec<IndicatorRow> = select
            .order(indicators::id.asc())
            .select(IndicatorRow::as_select())
            .load(&mut self.conn)
            .await?;
        Ok(rows.into_iter().map(Indicator::from).collect())
    }

    async fn select_reports(&mut self, query: &ReportQuery) -> AppResult<Vec<Report>> {
        let mut select = reports::table.into_boxed();
        select = match query {
            ReportQuery::All => select,
            ReportQuery::Id(id) => select.filter(reports::id.eq(*id)),
            ReportQuery::EmployeeId(employee_id) => {
                select.filter(reports::employee_id.eq(*employee_id))
            }
            ReportQuery::Status(status) => select.filter(reports::status.eq(*status)),
        };

        let rows: Vec<ReportRow> = select
            .order(reports::id.asc())
            .select(ReportRow::as_select())
            .load(&mut self.conn)
            .await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let attached: Vec<IndicatorRow> = indicators::table
            .filter(indicators::report_id.eq_any(&ids))
            .order(indicators::id.asc())
            .select(IndicatorRow::as_select())
            .load(&mut self.conn)
            .await?;

        let mut by_report: HashMap<i32, Vec<Indicator>> = HashMap::new();
        for row in attached {
            if let Some(report_id) = row.report_id {
                by_report.entry(report_id).or_default().push(row.into());
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let owned = by_report.remove(&row.id).unwrap_or_default();
                row.into_report(owned)
            })
            .collect())
    }

    async fn aggregate_indicator_value(
        &mut self,
        indicator_type: IndicatorType,
        aggregate: Aggregate,
    ) -> AppResult<Option<f64>> {
        let filtered = indicators::table.filter(indicators::indicator_type.eq(indicator_type));
        let result = match aggregate {
            Aggregate::Average => {
                filtered
                    .select(avg(indicators::value))
                    .get_result::<Option<f64>>(&mut self.conn)
                    .await?
            }
            Aggregate::Max => {
                filtered
                    .select(max(indicators::value))
                    .get_result::<Option<f64>>(&mut self.conn)
                    .await?
            }
        };
        Ok(result)
    }

    async fn apply(&mut self, changes: ChangeSet) -> AppResult<usize> {
        let applied = changes.len();
        self.conn
            .transaction(|conn| {
                async move {
                    for change in changes {
                        apply_change(conn, change).await?;
                    }
                    Ok::<_, AppError>(())
                }
                .scope_boxed()
            })
            .await?;
        Ok(applied)
    }
}

async fn apply_change(conn: &mut AsyncPgConnection, change: Change) -> AppResult<()> {
    match change {
        Change::Insert(Record::Employee(employee)) => {
            diesel::insert_into(employees::table)
                .values(&employee)
                .execute(conn)
                .await?;
        }
        Change::Insert(Record::Indicator(indicator)) => {
            diesel::insert_into(indicators::table)
                .values(&IndicatorRow::from_entity(&indicator, None))
                .execute(conn)
                .await?;
        }
        Change::Insert(Record::Report(report)) => {
            diesel::insert_into(reports::table)
                .values(&ReportRow::from(&report))
                .execute(conn)
                .await?;
            sync_report_indicators(conn, &report).await?;
        }
        Change::Update(Record::Employee(employee)) => {
            diesel::update(employees::table.find(employee.id))
                .set(&employee)
                .execute(conn)
                .await?;
        }
        Change::Update(Record::Indicator(indicator)) => {
            // the owning report is managed through report updates
            diesel::update(indicators::table.find(indicator.id))
                .set((
                    indicators::name.eq(&indicator.name),
                    indicators::value.eq(indicator.value),
                    indicators::indicator_type.eq(indicator.indicator_type),
                    indicators::collected_at.eq(indicator.collected_at.to_diesel()),
                ))
                .execute(conn)
                .await?;
        }
        Change::Update(Record::Report(report)) => {
            let updated = diesel::update(reports::table.find(report.id))
                .set(&ReportRow::from(&report))
                .execute(conn)
                .await?;
            if updated > 0 {
                sync_report_indicators(conn, &report).await?;
            }
        }
        Change::Delete(EntityKind::Employee, id) => {
            diesel::delete(employees::table.find(id))
                .execute(conn)
                .await?;
        }
        Change::Delete(EntityKind::Indicator, id) => {
            diesel::delete(indicators::table.find(id))
                .execute(conn)
                .await?;
        }
        Change::Delete(EntityKind::Report, id) => {
            // attached indicators go with it (ON DELETE CASCADE)
            diesel::delete(reports::table.find(id)).execute(conn).await?;
        }
    }
    Ok(())
}

/// Detaches indicators dropped from the collection and upserts the rest.
async fn sync_report_indicators(conn: &mut AsyncPgConnection, report: &Report) -> AppResult<()> {
    let keep: Vec<i32> = report.indicators.iter().map(|i| i.id).collect();

    diesel::update(
        indicators::table
            .filter(indicators::report_id.eq(report.id))
            .filter(indicators::id.ne_all(&keep)),
    )
    .set(indicators::report_id.eq(None::<i32>))
    .execute(conn)
    .await?;

    for indicator in &report.indicators {
        let row = IndicatorRow::from_entity(indicator, Some(report.id));
        diesel::insert_into(indicators::table)
            .values(&row)
            .on_conflict(indicators::id)
            .do_update()
            .set(&row)
            .execute(conn)
            .await?;
    }
    Ok(())
}
