//! Domain entities and their database row representations.
//!
//! Enumerations map onto PostgreSQL enum types through `DbEnum` and are
//! serialized as lowercase JSON strings.

mod employee;
mod indicator;
mod report;

pub use employee::{Employee, Role};
pub use indicator::{Indicator, IndicatorRow, IndicatorType};
pub use report::{Report, ReportRow, ReportStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_use_lowercase_json() {
        assert_eq!(serde_json::to_value(Role::Administrator).unwrap(), "administrator");
        assert_eq!(serde_json::to_value(IndicatorType::Co2).unwrap(), "co2");
        let status: ReportStatus = serde_json::from_value("rejected".into()).unwrap();
        assert_eq!(status, ReportStatus::Rejected);
        assert!(serde_json::from_value::<Role>("boss".into()).is_err());
    }

    #[test]
    fn display_matches_json_names() {
        for status in [
            ReportStatus::Draft,
            ReportStatus::Pending,
            ReportStatus::Approved,
            ReportStatus::Rejected,
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), status.to_string());
        }
        assert_eq!(Role::Manager.to_string(), "manager");
        assert_eq!(IndicatorType::Temperature.to_string(), "temperature");
    }
}
