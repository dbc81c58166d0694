use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff::civil::DateTime;
use jiff_diesel::ToDiesel;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Indicator;

/// Review state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ReportStatus")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Draft => write!(f, "draft"),
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::Approved => write!(f, "approved"),
            ReportStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Report entity with the indicators it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: i32,
    pub employee_id: i32,
    pub created_at: DateTime,
    pub content: String,
    pub is_printed: bool,
    pub status: ReportStatus,
    pub indicators: Vec<Indicator>,
}

impl Report {
    pub fn find_indicator(&self, indicator_id: i32) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.id == indicator_id)
    }

    /// Removes the indicator with the given id, returning it if it was attached.
    pub fn detach_indicator(&mut self, indicator_id: i32) -> Option<Indicator> {
        let position = self.indicators.iter().position(|i| i.id == indicator_id)?;
        Some(self.indicators.remove(position))
    }
}

/// `reports` table row. Indicators are loaded separately.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::reports)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReportRow {
    pub id: i32,
    pub employee_id: i32,
    pub created_at: jiff_diesel::DateTime,
    pub content: String,
    pub is_printed: bool,
    pub status: ReportStatus,
}

impl ReportRow {
    pub fn into_report(self, indicators: Vec<Indicator>) -> Report {
        Report {
            id: self.id,
            employee_id: self.employee_id,
            created_at: self.created_at.to_jiff(),
            content: self.content,
            is_printed: self.is_printed,
            status: self.status,
            indicators,
        }
    }
}

impl From<&Report> for ReportRow {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id,
            employee_id: report.employee_id,
            created_at: report.created_at.to_diesel(),
            content: report.content.clone(),
            is_printed: report.is_printed,
            status: report.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndicatorType;
    use jiff::civil::date;

    fn indicator(id: i32) -> Indicator {
        Indicator {
            id,
            name: format!("sensor-{id}"),
            value: 1.0,
            indicator_type: IndicatorType::Noise,
            collected_at: date(2024, 1, 1).at(0, 0, 0, 0),
        }
    }

    #[test]
    fn detach_removes_only_matching_indicator() {
        let mut report = Report {
            id: 5,
            employee_id: 1,
            created_at: date(2024, 1, 2).at(9, 0, 0, 0),
            content: String::new(),
            is_printed: false,
            status: ReportStatus::Draft,
            indicators: vec![indicator(9), indicator(10)],
        };

        assert_eq!(report.detach_indicator(9).map(|i| i.id), Some(9));
        assert!(report.detach_indicator(9).is_none());
        assert_eq!(report.indicators.len(), 1);
        assert!(report.find_indicator(10).is_some());
    }

    #[test]
    fn row_round_trip_keeps_scalar_fields() {
        let report = Report {
            id: 2,
            employee_id: 3,
            created_at: date(2024, 6, 1).at(12, 0, 0, 0),
            content: "quarterly".into(),
            is_printed: true,
            status: ReportStatus::Approved,
            indicators: Vec::new(),
        };
        let row = ReportRow::from(&report);
        assert_eq!(row.into_report(Vec::new()), report);
    }
}
