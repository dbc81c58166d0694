//! Migrate command handler
//!
//! Handles database migration operations including dry-run and rollback.

use crate::config::{Settings, StoreBackend};
use crate::db::{pending_migrations, revert_migrations, run_migrations};
use crate::error::{AppError, AppResult};

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Applies pending migrations, lists them (`dry_run`) or reverts the
    /// last `rollback` ones.
    ///
    /// # Errors
    /// - `Validation` when the configured backend is not postgres
    /// - Database connection and migration errors
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate()?;
        if self.config.database.backend != StoreBackend::Postgres {
            return Err(AppError::validation(
                "database.backend",
                "Migrations require the postgres backend",
            ));
        }
        let url = self.config.database.url.clone();

        if dry_run {
            println!("Checking for pending migrations...");
            let pending = pending_migrations(url).await?;
            if pending.is_empty() {
                println!("✓ No pending migrations found - database is up to date");
            } else {
                println!("Found {} pending migration(s):", pending.len());
                for name in &pending {
                    println!("  - {name}");
                }
                println!("\nRun without --dry-run to apply these migrations");
            }
            return Ok(());
        }

        if let Some(steps) = rollback {
            println!("Rolling back {steps} migration(s)...");
            let reverted = revert_migrations(url, steps).await?;
            tracing::info!(reverted, "Migrations reverted");
            println!("✓ Reverted {reverted} migration(s)");
            return Ok(());
        }

        println!("Running database migrations...");
        let applied = run_migrations(url).await?;
        if applied.is_empty() {
            println!("✓ No migrations to apply - database is already up to date");
        } else {
            tracing::info!(count = applied.len(), "Migrations applied");
            println!("✓ Applied {} migration(s):", applied.len());
            for version in &applied {
                println!("  - {version}");
            }
        }
        Ok(())
    }
}
