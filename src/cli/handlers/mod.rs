//! Command handlers for CLI operations
//!
//! Each handler owns the merged settings and performs one subcommand.

pub mod migrate;
pub mod serve;
pub mod token;

pub use migrate::MigrateCommandHandler;
pub use serve::ServeCommandHandler;
pub use token::TokenCommandHandler;
