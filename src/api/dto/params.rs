//! Query parameters and small request/response bodies of the HTTP surface.

use jiff::civil::DateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{IndicatorType, ReportStatus, Role};

/// Zero-based page index.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    #[serde(default)]
    #[param(minimum = 0, example = 0)]
    pub page: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoleQuery {
    pub role: Role,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    #[param(example = "ada@ecotrack.io")]
    pub email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IndicatorTypeQuery {
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
}

/// Inclusive collection window.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    #[param(value_type = String, format = DateTime, example = "2024-03-01T00:00:00")]
    pub start: DateTime,
    #[param(value_type = String, format = DateTime, example = "2024-03-31T23:59:59")]
    pub end: DateTime,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MinValueQuery {
    #[param(example = 400.0)]
    pub min: f64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    pub status: ReportStatus,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AssignRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: ReportStatus,
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct ContentRequest {
    #[validate(length(max = 65536, message = "Content is too long"))]
    #[schema(example = "Quarterly CO2 readings are within target.")]
    pub content: String,
}

/// Result of an indicator aggregate.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AggregateResponse {
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    #[schema(example = 412.5)]
    pub value: f64,
}
