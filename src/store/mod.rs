//! Entity store abstraction.
//!
//! A [`Store`] hands out [`StoreSession`]s. A session answers typed selects
//! and applies a [`ChangeSet`] atomically: either every change is applied or
//! none is. Two backends are provided: [`PgStore`] on PostgreSQL and
//! [`MemoryStore`] for tests and local runs. Both enforce the same rules:
//! unique ids, a report must reference an existing employee, deleting an
//! employee that owns reports is rejected, and deleting a report deletes the
//! indicators attached to it.

mod memory;
mod postgres;

use std::fmt;

use async_trait::async_trait;
use jiff::civil::DateTime;

use crate::error::AppResult;
use crate::models::{Employee, Indicator, IndicatorType, Report, ReportStatus, Role};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeQuery {
    All,
    Id(i32),
    Role(Role),
    Email(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorQuery {
    All,
    Id(i32),
    Type(IndicatorType),
    /// Inclusive on both ends.
    DateRange { start: DateTime, end: DateTime },
    /// Inclusive lower bound on `value`.
    AboveValue(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportQuery {
    All,
    Id(i32),
    EmployeeId(i32),
    Status(ReportStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Average,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Employee,
    Indicator,
    Report,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Employee => "Employee",
            EntityKind::Indicator => "Indicator",
            EntityKind::Report => "Report",
        };
        f.write_str(name)
    }
}

/// Full entity value carried by inserts and updates.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Employee(Employee),
    Indicator(Indicator),
    Report(Report),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Employee(_) => EntityKind::Employee,
            Record::Indicator(_) => EntityKind::Indicator,
            Record::Report(_) => EntityKind::Report,
        }
    }
}

/// A staged mutation.
///
/// Updating or deleting an id that is not stored is a no-op. Updating a
/// report replaces its indicator collection: indicators no longer listed are
/// detached (kept, with no owning report), listed ones are attached and
/// inserted when missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert(Record),
    Update(Record),
    Delete(EntityKind, i32),
}

impl Change {
    pub fn kind(&self) -> EntityKind {
        match self {
            Change::Insert(record) | Change::Update(record) => record.kind(),
            Change::Delete(kind, _) => *kind,
        }
    }
}

pub type ChangeSet = Vec<Change>;

/// Connection factory for a backend.
#[async_trait]
pub trait Store: Send + Sync {
    /// Opens a session bound to one unit of work.
    async fn open_session(&self) -> AppResult<Box<dyn StoreSession>>;

    /// Short backend name used in logs and health output.
    fn backend(&self) -> &'static str;

    /// Cheap liveness probe.
    async fn ping(&self) -> AppResult<()> {
        self.open_session().await.map(|_| ())
    }
}

/// One open connection to a backend.
#[async_trait]
pub trait StoreSession: Send {
    async fn select_employees(&mut self, query: &EmployeeQuery) -> AppResult<Vec<Employee>>;

    async fn select_indicators(&mut self, query: &IndicatorQuery) -> AppResult<Vec<Indicator>>;

    /// Reports are returned with their indicator collections loaded.
    async fn select_reports(&mut self, query: &ReportQuery) -> AppResult<Vec<Report>>;

    /// `None` when no indicator of `indicator_type` is stored.
    async fn aggregate_indicator_value(
        &mut self,
        indicator_type: IndicatorType,
        aggregate: Aggregate,
    ) -> AppResult<Option<f64>>;

    /// Applies every change in one transaction and returns how many were applied.
    async fn apply(&mut self, changes: ChangeSet) -> AppResult<usize>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use jiff::civil::date;

    use crate::models::{Employee, Indicator, IndicatorType, Report, ReportStatus, Role};

    pub fn employee(id: i32, role: Role) -> Employee {
        Employee {
            id,
            name: format!("Employee {id}"),
            email: format!("employee{id}@ecotrack.test"),
            phone_number: format!("+1-555-01{id:02}"),
            role,
        }
    }

    pub fn indicator(id: i32, indicator_type: IndicatorType, value: f64) -> Indicator {
        Indicator {
            id,
            name: format!("{indicator_type}-sensor-{id}"),
            value,
            indicator_type,
            collected_at: date(2024, 3, 1).at(8, 0, 0, 0),
        }
    }

    pub fn report(id: i32, employee_id: i32) -> Report {
        Report {
            id,
            employee_id,
            created_at: date(2024, 3, 2).at(10, 0, 0, 0),
            content: String::new(),
            is_printed: false,
            status: ReportStatus::Draft,
            indicators: Vec::new(),
        }
    }
}
