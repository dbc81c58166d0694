//! Command executor for dispatching CLI commands
//!
//! Runs after parsing, configuration merging and logger initialization.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler, TokenCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::AppResult;

/// Dispatches to the handler of the parsed subcommand; no subcommand means
/// `serve`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match &cli.command {
        Some(Commands::Serve { dry_run, .. }) => {
            ServeCommandHandler::new(settings).execute(*dry_run).await
        }
        None => ServeCommandHandler::new(settings).execute(false).await,
        Some(Commands::Migrate { dry_run, rollback }) => {
            warn_on_large_rollback(*rollback);
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await
        }
        Some(Commands::Token {
            employee_id,
            roles,
            hours,
        }) => TokenCommandHandler::new(settings).execute(*employee_id, roles, *hours),
    }
}

fn warn_on_large_rollback(rollback: Option<u32>) {
    if let Some(steps) = rollback
        && steps > 50
    {
        tracing::warn!(steps, "Rolling back a large number of migrations");
    }
}
