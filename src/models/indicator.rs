use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use jiff::civil::DateTime;
use jiff_diesel::ToDiesel;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What an indicator measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, DbEnum)]
#[db_enum(existing_type_path = "crate::schema::sql_types::IndicatorType")]
#[serde(rename_all = "lowercase")]
pub enum IndicatorType {
    Co2,
    Temperature,
    Humidity,
    Noise,
    Energy,
}

impl std::fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndicatorType::Co2 => write!(f, "co2"),
            IndicatorType::Temperature => write!(f, "temperature"),
            IndicatorType::Humidity => write!(f, "humidity"),
            IndicatorType::Noise => write!(f, "noise"),
            IndicatorType::Energy => write!(f, "energy"),
        }
    }
}

/// A single measured value.
///
/// An indicator may belong to at most one report; the link is stored on the
/// row (see [`IndicatorRow::report_id`]) and is not part of the entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub id: i32,
    pub name: String,
    pub value: f64,
    pub indicator_type: IndicatorType,
    pub collected_at: DateTime,
}

/// `indicators` table row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::indicators)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct IndicatorRow {
    pub id: i32,
    pub name: String,
    pub value: f64,
    pub indicator_type: IndicatorType,
    pub collected_at: jiff_diesel::DateTime,
    pub report_id: Option<i32>,
}

impl IndicatorRow {
    pub fn from_entity(indicator: &Indicator, report_id: Option<i32>) -> Self {
        Self {
            id: indicator.id,
            name: indicator.name.clone(),
            value: indicator.value,
            indicator_type: indicator.indicator_type,
            collected_at: indicator.collected_at.to_diesel(),
            report_id,
        }
    }
}

impl From<IndicatorRow> for Indicator {
    fn from(row: IndicatorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            value: row.value,
            indicator_type: row.indicator_type,
            collected_at: row.collected_at.to_jiff(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn row_conversion_keeps_fields() {
        let indicator = Indicator {
            id: 1,
            name: "CO2-sensor-1".into(),
            value: 412.5,
            indicator_type: IndicatorType::Co2,
            collected_at: date(2024, 3, 1).at(8, 30, 0, 0),
        };
        let row = IndicatorRow::from_entity(&indicator, Some(5));
        assert_eq!(row.report_id, Some(5));
        assert_eq!(Indicator::from(row), indicator);
    }
}
