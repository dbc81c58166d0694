//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::Role;

/// EcoTrack environmental monitoring backend
#[derive(Parser, Debug)]
#[command(name = "ecotrack")]
#[command(about = "EcoTrack environmental monitoring backend")]
#[command(long_about = "
EcoTrack tracks employees, environmental indicators and the reports built
from them. It serves a JSON API backed by PostgreSQL or an in-memory store.

EXAMPLES:
    # Start the server with default configuration
    ecotrack serve

    # Start server on custom host and port
    ecotrack serve --host 0.0.0.0 --port 8080

    # Use a single configuration file
    ecotrack --config /etc/ecotrack/production.toml serve

    # Check configuration without starting server
    ecotrack serve --dry-run

    # Apply or preview database migrations
    ecotrack migrate
    ecotrack migrate --dry-run

    # Rollback last 2 migrations
    ecotrack migrate --rollback 2

    # Mint an administrator token for local testing
    ecotrack token --employee-id 1 --role administrator
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Loads this single TOML file instead of the layered configuration
    /// directory. `ECOTRACK_*` environment variables still apply on top.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is loaded.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server (default)
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level override
        ///
        /// Takes precedence over the global --verbose/--quiet flags.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    ///
    /// Requires the postgres backend.
    Migrate {
        /// Show pending migrations without applying
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of migrations to rollback
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
    /// Mint a bearer token signed with the configured JWT secret
    Token {
        /// Employee id placed in the token subject
        #[arg(long, value_name = "ID")]
        employee_id: i32,

        /// Role carried by the token; repeat for several roles
        #[arg(long = "role", value_name = "ROLE", required = true, value_enum, ignore_case = true)]
        roles: Vec<Role>,

        /// Lifetime in hours; defaults to `jwt.access_token_expiration`
        #[arg(long, value_name = "HOURS", value_parser = clap::value_parser!(i64).range(1..))]
        hours: Option<i64>,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["ecotrack", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_default_behavior() {
        let cli = Cli::try_parse_from(["ecotrack"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert!(!cli.quiet);
        assert!(cli.config.is_none());
        assert!(cli.env.is_none());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from([
            "ecotrack",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--log-level",
            "warning",
        ])
        .unwrap();
        let Some(Commands::Serve {
            host,
            port,
            log_level,
            dry_run,
        }) = cli.command
        else {
            panic!("Expected Serve command");
        };
        assert_eq!(host.as_deref(), Some("0.0.0.0"));
        assert_eq!(port, Some(9000));
        assert_eq!(log_level, Some(LogLevel::Warn));
        assert!(!dry_run);
    }

    #[test]
    fn test_migrate_flags_conflict() {
        let cli = Cli::try_parse_from(["ecotrack", "migrate", "--dry-run"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Migrate {
                dry_run: true,
                rollback: None
            })
        ));

        let err = Cli::try_parse_from(["ecotrack", "migrate", "--dry-run", "--rollback", "1"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_token_command_collects_roles() {
        let cli = Cli::try_parse_from([
            "ecotrack",
            "token",
            "--employee-id",
            "7",
            "--role",
            "administrator",
            "--role",
            "Manager",
        ])
        .unwrap();
        let Some(Commands::Token {
            employee_id,
            roles,
            hours,
        }) = cli.command
        else {
            panic!("Expected Token command");
        };
        assert_eq!(employee_id, 7);
        assert_eq!(roles, vec![Role::Administrator, Role::Manager]);
        assert!(hours.is_none());
    }

    #[test]
    fn test_token_requires_a_role() {
        let err = Cli::try_parse_from(["ecotrack", "token", "--employee-id", "7"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        assert!(
            Cli::try_parse_from(["ecotrack", "token", "--employee-id", "7", "--role", "boss"])
                .is_err()
        );
    }

    #[test]
    fn test_conflicting_verbose_quiet() {
        let err = Cli::try_parse_from(["ecotrack", "--verbose", "--quiet"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }
}
