//! HTTP API layer: handlers, middleware, transport DTOs and the router.
//!
//! The API is a thin consumer of the service layer; it never touches
//! repositories or the store except for health checks.

pub mod doc;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
