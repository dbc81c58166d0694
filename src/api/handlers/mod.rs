//! HTTP request handlers for API endpoints, one module per resource.
//!
//! Every handler opens one unit of work through
//! [`AppState::with_services`](crate::state::AppState::with_services).

pub mod employees;
pub mod health;
pub mod indicators;
pub mod reports;
