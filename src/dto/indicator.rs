use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Indicator, IndicatorType};

/// Indicator as seen by service consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorDto {
    #[schema(example = 1)]
    pub id: i32,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    #[schema(example = "CO2-sensor-1")]
    pub name: String,
    #[schema(example = 412.5)]
    pub value: f64,
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    #[schema(value_type = String, format = DateTime, example = "2024-03-01T08:30:00")]
    pub collected_at: DateTime,
}

impl From<Indicator> for IndicatorDto {
    fn from(indicator: Indicator) -> Self {
        Self {
            id: indicator.id,
            name: indicator.name,
            value: indicator.value,
            indicator_type: indicator.indicator_type,
            collected_at: indicator.collected_at,
        }
    }
}

impl From<IndicatorDto> for Indicator {
    fn from(dto: IndicatorDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            value: dto.value,
            indicator_type: dto.indicator_type,
            collected_at: dto.collected_at,
        }
    }
}
