//! Data Transfer Objects specific to the HTTP surface.
//!
//! Entity DTOs live in [`crate::dto`]; this module only holds what the
//! transport adds on top of them:
//! - `error` - Common error response body
//! - `health` - Health check responses
//! - `params` - Query parameters and small request bodies

mod error;
mod health;
mod params;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use params::{
    AggregateResponse, AssignRoleRequest, ContentRequest, DateRangeQuery, EmailQuery,
    IndicatorTypeQuery, MinValueQuery, PageParams, RoleQuery, StatusQuery, UpdateStatusRequest,
};
