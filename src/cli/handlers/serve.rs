//! Serve command handler
//!
//! Handles the serve command including dry-run validation and server startup.

use crate::config::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Runs the server until a shutdown signal, or only validates the
    /// configuration when `dry_run` is set.
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Store connection, bind or server runtime errors
    pub async fn execute(&self, dry_run: bool) -> AppResult<()> {
        self.config.validate()?;

        if dry_run {
            self.print_summary();
            return Ok(());
        }

        Server::new(self.config.clone())
            .run()
            .await
            .map_err(|source| crate::error::AppError::Internal { source })
    }

    fn print_summary(&self) {
        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!("✓ Store backend: {}", self.config.database.backend);
        println!(
            "✓ Employee page size: {}",
            self.config.pagination.employee_page_size
        );
        println!("Dry run completed successfully");
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}
