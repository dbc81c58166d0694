//! In-process store.
//!
//! Tables live behind one async mutex. `apply` works on a copy of the tables
//! and swaps it in only when every change succeeded.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult, ConstraintKind};
use crate::models::{Employee, Indicator, IndicatorType, Report};
use crate::store::{
    Aggregate, Change, ChangeSet, EmployeeQuery, EntityKind, IndicatorQuery, Record, ReportQuery,
    Store, StoreSession,
};

#[derive(Debug, Clone)]
struct StoredIndicator {
    indicator: Indicator,
    report_id: Option<i32>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    employees: BTreeMap<i32, Employee>,
    indicators: BTreeMap<i32, StoredIndicator>,
    /// Stored with an empty indicator collection; filled on select.
    reports: BTreeMap<i32, Report>,
}

#[derive(Debug, Default)]
struct Counters {
    commits: AtomicUsize,
    open_sessions: AtomicUsize,
}

/// Memory-backed [`Store`]. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    counters: Arc<Counters>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts records directly, without counting a commit.
    pub async fn seed(&self, records: impl IntoIterator<Item = Record>) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let mut next = tables.clone();
        for record in records {
            next.apply(Change::Insert(record))?;
        }
        *tables = next;
        Ok(())
    }

    /// Number of successful `apply` calls across all sessions.
    pub fn commit_count(&self) -> usize {
        self.counters.commits.load(Ordering::SeqCst)
    }

    /// Number of sessions that have been opened and not yet dropped.
    pub fn open_sessions(&self) -> usize {
        self.counters.open_sessions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn open_session(&self) -> AppResult<Box<dyn StoreSession>> {
        self.counters.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            tables: Arc::clone(&self.tables),
            counters: Arc::clone(&self.counters),
        }))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct MemorySession {
    tables: Arc<Mutex<Tables>>,
    counters: Arc<Counters>,
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.counters.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn select_employees(&mut self, query: &EmployeeQuery) -> AppResult<Vec<Employee>> {
        let tables = self.tables.lock().await;
        let rows = tables.employees.values().filter(|e| match query {
            EmployeeQuery::All => true,
            EmployeeQuery::Id(id) => e.id == *id,
            EmployeeQuery::Role(role) => e.role == *role,
            EmployeeQuery::Email(email) => e.email == *email,
        });
        Ok(rows.cloned().collect())
    }

    async fn select_indicators(&mut self, query: &IndicatorQuery) -> AppResult<Vec<Indicator>> {
        let tables = self.tables.lock().await;
        let rows = tables
            .indicators
            .values()
            .map(|stored| &stored.indicator)
            .filter(|i| match query {
                IndicatorQuery::All => true,
                IndicatorQuery::Id(id) => i.id == *id,
                IndicatorQuery::Type(t) => i.indicator_type == *t,
                IndicatorQuery::DateRange { start, end } => {
                    i.collected_at >= *start && i.collected_at <= *end
                }
                IndicatorQuery::AboveValue(min) => i.value >= *min,
            });
        Ok(rows.cloned().collect())
    }

    async fn select_reports(&mut self, query: &ReportQuery) -> AppResult<Vec<Report>> {
        let tables = self.tables.lock().await;
        let rows = tables
            .reports
            .values()
            .filter(|r| match query {
                ReportQuery::All => true,
                ReportQuery::Id(id) => r.id == *id,
                ReportQuery::EmployeeId(employee_id) => r.employee_id == *employee_id,
                ReportQuery::Status(status) => r.status == *status,
            })
            .map(|r| {
                let mut report = r.clone();
                report.indicators = tables.indicators_of(r.id);
                report
            });
        Ok(rows.collect())
    }

    async fn aggregate_indicator_value(
        &mut self,
        indicator_type: IndicatorType,
        aggregate: Aggregate,
    ) -> AppResult<Option<f64>> {
        let tables = self.tables.lock().await;
        let values: Vec<f64> = tables
            .indicators
            .values()
            .filter(|s| s.indicator.indicator_type == indicator_type)
            .map(|s| s.indicator.value)
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        let result = match aggregate {
            Aggregate::Average => values.iter().sum::<f64>() / values.len() as f64,
            Aggregate::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };
        Ok(Some(result))
    }

    async fn apply(&mut self, changes: ChangeSet) -> AppResult<usize> {
        let mut tables = self.tables.lock().await;
        let mut next = tables.clone();
        let applied = changes.len();
        for change in changes {
            next.apply(change)?;
        }
        *tables = next;
        self.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(applied)
    }
}

fn duplicate(table: &str, id: i32) -> AppError {
    AppError::Constraint {
        kind: ConstraintKind::Unique,
        table: table.to_string(),
        detail: format!("id={id} already exists"),
    }
}

impl Tables {
    fn indicators_of(&self, report_id: i32) -> Vec<Indicator> {
        self.indicators
            .values()
            .filter(|s| s.report_id == Some(report_id))
            .map(|s| s.indicator.clone())
            .collect()
    }

    fn apply(&mut self, change: Change) -> AppResult<()> {
        match change {
            Change::Insert(Record::Employee(employee)) => {
                if self.employees.contains_key(&employee.id) {
                    return Err(duplicate("employees", employee.id));
                }
                self.employees.insert(employee.id, employee);
            }
            Change::Insert(Record::Indicator(indicator)) => {
                if self.indicators.contains_key(&indicator.id) {
                    return Err(duplicate("indicators", indicator.id));
                }
                self.indicators.insert(
                    indicator.id,
                    StoredIndicator {
                        indicator,
                        report_id: None,
                    },
                );
            }
            Change::Insert(Record::Report(report)) => {
                if self.reports.contains_key(&report.id) {
                    return Err(duplicate("reports", report.id));
                }
                self.check_employee_reference(report.employee_id)?;
                self.store_report(report);
            }
            Change::Update(Record::Employee(employee)) => {
                if let Some(stored) = self.employees.get_mut(&employee.id) {
                    *stored = employee;
                }
            }
            Change::Update(Record::Indicator(indicator)) => {
                if let Some(stored) = self.indicators.get_mut(&indicator.id) {
                    stored.indicator = indicator;
                }
            }
            Change::Update(Record::Report(report)) => {
                if self.reports.contains_key(&report.id) {
                    self.check_employee_reference(report.employee_id)?;
                    self.store_report(report);
                }
            }
            Change::Delete(EntityKind::Employee, id) => {
                if self.reports.values().any(|r| r.employee_id == id) {
                    return Err(AppError::Constraint {
                        kind: ConstraintKind::ForeignKey,
                        table: "employees".to_string(),
                        detail: format!("id={id} is still referenced from reports"),
                    });
                }
                self.employees.remove(&id);
            }
            Change::Delete(EntityKind::Indicator, id) => {
                self.indicators.remove(&id);
            }
            Change::Delete(EntityKind::Report, id) => {
                if self.reports.remove(&id).is_some() {
                    self.indicators.retain(|_, s| s.report_id != Some(id));
                }
            }
        }
        Ok(())
    }

    fn check_employee_reference(&self, employee_id: i32) -> AppResult<()> {
        if self.employees.contains_key(&employee_id) {
            Ok(())
        } else {
            Err(AppError::Constraint {
                kind: ConstraintKind::ForeignKey,
                table: "reports".to_string(),
                detail: format!("employee_id={employee_id} does not reference an existing row"),
            })
        }
    }

    /// Writes the report row and makes its indicator links match the collection.
    fn store_report(&mut self, mut report: Report) {
        let report_id = report.id;
        let attached = std::mem::take(&mut report.indicators);
        let keep: HashSet<i32> = attached.iter().map(|i| i.id).collect();

        for stored in self.indicators.values_mut() {
            if stored.report_id == Some(report_id) && !keep.contains(&stored.indicator.id) {
                stored.report_id = None;
            }
        }
        for indicator in attached {
            self.indicators.insert(
                indicator.id,
                StoredIndicator {
                    indicator,
                    report_id: Some(report_id),
                },
            );
        }
        self.reports.insert(report_id, report);
    }
}
