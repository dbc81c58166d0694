use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Report, ReportStatus};

/// Report as seen by service consumers.
///
/// The indicator collection is not part of the DTO; it is managed through
/// the dedicated add/remove operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportDto {
    #[schema(example = 5)]
    pub id: i32,
    #[schema(example = 1)]
    pub employee_id: i32,
    #[schema(value_type = String, format = DateTime, example = "2024-03-02T10:00:00")]
    pub created_at: DateTime,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_printed: bool,
    pub status: ReportStatus,
}

impl From<Report> for ReportDto {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            employee_id: report.employee_id,
            created_at: report.created_at,
            content: report.content,
            is_printed: report.is_printed,
            status: report.status,
        }
    }
}

impl From<ReportDto> for Report {
    fn from(dto: ReportDto) -> Self {
        Self {
            id: dto.id,
            employee_id: dto.employee_id,
            created_at: dto.created_at,
            content: dto.content,
            is_printed: dto.is_printed,
            status: dto.status,
            indicators: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printed_flag_defaults_to_false() {
        let dto: ReportDto = serde_json::from_str(
            r#"{"id":5,"employeeId":1,"createdAt":"2024-03-02T10:00:00","status":"draft"}"#,
        )
        .unwrap();
        assert!(!dto.is_printed);
        assert!(dto.content.is_empty());
        assert!(Report::from(dto).indicators.is_empty());
    }
}
