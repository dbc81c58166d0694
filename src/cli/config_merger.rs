//! Configuration merger for CLI arguments and config files
//!
//! Precedence, lowest first: configuration files, `ECOTRACK_*` variables,
//! global flags (`--verbose`/`--quiet`), command flags.

use std::path::Path;

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration the way the CLI asks for it.
    ///
    /// `--config` switches the loader to single-file mode and `--env`
    /// overrides `ECOTRACK_APP_ENV`.
    ///
    /// # Errors
    /// Returns ConfigError if configuration loading or validation fails
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = cli.config.as_deref() {
            Self::validate_config_file_access(path)?;
            loader = loader.with_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        Ok(Self::new(loader.load()?))
    }

    fn validate_config_file_access(path: &Path) -> Result<(), ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::validation(
                "config_file",
                format!("Configuration file does not exist: '{}'", path.display()),
            ));
        }
        std::fs::File::open(path).map(|_| ()).map_err(|e| {
            ConfigError::validation(
                "config_file",
                format!("Cannot read configuration file '{}': {e}", path.display()),
            )
        })
    }

    /// Applies CLI overrides to a copy of the base configuration and
    /// validates the result.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            // Command-specific level beats the global flags
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreBackend;
    use clap::Parser;

    fn valid_base_config() -> Settings {
        let mut config = Settings::default();
        config.database.backend = StoreBackend::Memory;
        config.jwt.secret = "0123456789abcdef0123456789abcdef".to_string();
        config
    }

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(valid_base_config()).merge_cli_args(&cli)
    }

    #[test]
    fn no_flags_keep_base() {
        let merger = ConfigurationMerger::new(valid_base_config());
        let cli = Cli::try_parse_from(["ecotrack"]).unwrap();
        assert_eq!(&merger.merge_cli_args(&cli).unwrap(), merger.config());
    }

    #[test]
    fn global_flags_set_level() {
        assert_eq!(merge(&["ecotrack", "--verbose"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["ecotrack", "--quiet"]).unwrap().logger.level, "error");
    }

    #[test]
    fn serve_flags_override_server() {
        let merged = merge(&["ecotrack", "serve", "--host", "0.0.0.0", "--port", "9090"]).unwrap();
        assert_eq!(merged.server.host, "0.0.0.0");
        assert_eq!(merged.server.port, 9090);
    }

    #[test]
    fn command_log_level_overrides_global() {
        let merged = merge(&["ecotrack", "--verbose", "serve", "--log-level", "warn"]).unwrap();
        assert_eq!(merged.logger.level, "warn");
    }

    #[test]
    fn merged_config_is_validated() {
        let mut base = valid_base_config();
        base.jwt.secret = "short".to_string();
        let cli = Cli::try_parse_from(["ecotrack", "serve"]).unwrap();

        let err = ConfigurationMerger::new(base).merge_cli_args(&cli).unwrap_err();
        assert_eq!(err.key(), "jwt.secret");
    }
}
