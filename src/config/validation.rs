//! Configuration validation logic
//!
//! Each section checks its own values; [`Settings::validate`] reports the
//! first failure.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, JwtConfig, LoggerSettings, PaginationConfig, ServerConfig,
    Settings, StoreBackend,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const MIN_JWT_SECRET_LEN: usize = 32;

impl ServerConfig {
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535.",
            ));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }
        Ok(())
    }
}

impl DatabaseConfig {
    /// # Validation Rules
    /// - The postgres backend needs a `postgres://` or `postgresql://` URL
    /// - Pool sizes must be positive with min not above max
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == StoreBackend::Postgres {
            if self.url.is_empty() {
                return Err(ConfigError::validation(
                    "database.url",
                    "Database URL is required for the postgres backend.",
                ));
            }
            if !self.is_valid_database_url() {
                return Err(ConfigError::validation(
                    "database.url",
                    "Invalid database URL. Expected postgres://[user:password@]host[:port]/database",
                ));
            }
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }
        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            ));
        }
        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }
        Ok(())
    }

    fn is_valid_database_url(&self) -> bool {
        ["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::validation(
                "jwt.secret",
                format!("JWT secret must be at least {MIN_JWT_SECRET_LEN} characters."),
            ));
        }
        if self.access_token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.access_token_expiration",
                "Access token expiration must be positive.",
            ));
        }
        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }
        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }
        Ok(())
    }
}

impl LoggerSettings {
    /// # Validation Rules
    /// - Level must be one of: trace, debug, info, warn, error
    /// - At least one output must be enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }
        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }
        self.file.validate()
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.employee_page_size == 0 {
            return Err(ConfigError::validation(
                "pagination.employee_page_size",
                "Page size must be greater than 0.",
            ));
        }
        Ok(())
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.jwt.validate()?;
        self.logger.validate()?;
        self.pagination.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        Settings {
            database: DatabaseConfig {
                url: "postgres://localhost/ecotrack".to_string(),
                ..DatabaseConfig::default()
            },
            jwt: JwtConfig {
                secret: "x".repeat(32),
                ..JwtConfig::default()
            },
            ..Settings::default()
        }
    }

    fn failing_field(settings: &Settings) -> String {
        match settings.validate() {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_settings_pass() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn port_zero_is_rejected() {
        let mut settings = valid_settings();
        settings.server.port = 0;
        assert_eq!(failing_field(&settings), "server.port");
    }

    #[test]
    fn postgres_backend_requires_url() {
        let mut settings = valid_settings();
        settings.database.url.clear();
        assert_eq!(failing_field(&settings), "database.url");

        settings.database.url = "mysql://localhost/db".to_string();
        assert_eq!(failing_field(&settings), "database.url");
    }

    #[test]
    fn memory_backend_needs_no_url() {
        let mut settings = valid_settings();
        settings.database.backend = StoreBackend::Memory;
        settings.database.url.clear();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn pool_bounds_are_checked() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        settings.database.max_connections = 5;
        assert_eq!(failing_field(&settings), "database.min_connections");

        settings.database.min_connections = 1;
        settings.database.max_connections = 0;
        assert_eq!(failing_field(&settings), "database.max_connections");
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let mut settings = valid_settings();
        settings.jwt.secret = "short".to_string();
        assert_eq!(failing_field(&settings), "jwt.secret");

        settings.jwt.secret = "y".repeat(40);
        settings.jwt.access_token_expiration = 0;
        assert_eq!(failing_field(&settings), "jwt.access_token_expiration");
    }

    #[test]
    fn logger_level_and_outputs_are_checked() {
        let mut settings = valid_settings();
        settings.logger.level = "verbose".to_string();
        assert_eq!(failing_field(&settings), "logger.level");

        settings.logger.level = "WARN".to_string();
        settings.logger.console.enabled = false;
        assert_eq!(failing_field(&settings), "logger");

        settings.logger.file.enabled = true;
        settings.logger.file.path = "  ".to_string();
        assert_eq!(failing_field(&settings), "logger.file.path");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let mut settings = valid_settings();
        settings.pagination.employee_page_size = 0;
        assert_eq!(failing_field(&settings), "pagination.employee_page_size");
    }
}
