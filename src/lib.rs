//! EcoTrack library
//!
//! Layered backend for employees, environmental indicators and reports:
//! store backends at the bottom, repositories and a unit of work above them,
//! services on top, and an HTTP API plus CLI as consumers.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod logger;
pub mod models;
pub mod repositories;
pub mod schema;
pub mod security;
pub mod server;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
