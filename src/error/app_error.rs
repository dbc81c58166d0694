use crate::error::DatabaseErrorConverter;
use std::fmt;
use thiserror::Error;

/// Kind of store constraint that rejected a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintKind::Unique => "unique",
            ConstraintKind::ForeignKey => "foreign key",
            ConstraintKind::NotNull => "not-null",
            ConstraintKind::Check => "check",
        };
        f.write_str(name)
    }
}

/// Application-wide error type.
///
/// Domain variants (`EntityAlreadyExists`, `EntityNotFound`, `AccessDenied`,
/// `Validation`, `Unauthorized`) are raised by services and are recoverable
/// by the caller. Infrastructure variants come from the store and are
/// propagated unchanged; see [`AppError::is_infrastructure`].
#[derive(Error, Debug)]
pub enum AppError {
    /// An entity with the same identifier is already stored
    #[error("{entity} with id {id} already exists")]
    EntityAlreadyExists { entity: String, id: String },

    /// Lookup by a key found nothing
    #[error("{entity} with {field}={value} not found")]
    EntityNotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Caller is missing or lacks the required role
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Request body, path or query could not be decoded
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// Missing, malformed or expired credentials
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The store rejected a change because it violates a constraint
    #[error("{kind} constraint violated on {table}: {detail}")]
    Constraint {
        kind: ConstraintKind,
        table: String,
        detail: String,
    },

    /// Database operation error with operation context
    #[error("Database operation failed: {operation}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Connection pool error
    #[error("Connection pool error")]
    ConnectionPool {
        #[source]
        source: anyhow::Error,
    },

    /// The unit of work was disposed before the call
    #[error("Store session is closed")]
    SessionClosed,

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn already_exists(entity: &str, id: impl ToString) -> Self {
        AppError::EntityAlreadyExists {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn not_found(entity: &str, field: &str, value: impl ToString) -> Self {
        AppError::EntityNotFound {
            entity: entity.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        AppError::AccessDenied {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error originates in the store rather than in a domain rule.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AppError::Constraint { .. }
                | AppError::Database { .. }
                | AppError::ConnectionPool { .. }
                | AppError::SessionClosed
                | AppError::Internal { .. }
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<diesel::result::Error> for AppError {
    fn from(error: diesel::result::Error) -> Self {
        DatabaseErrorConverter::convert_diesel_error(error, "database operation")
    }
}

impl From<bb8::RunError<diesel_async::pooled_connection::PoolError>> for AppError {
    fn from(error: bb8::RunError<diesel_async::pooled_connection::PoolError>) -> Self {
        AppError::ConnectionPool {
            source: anyhow::Error::msg(error.to_string()),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(rejection: axum::extract::rejection::QueryRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<axum::extract::rejection::PathRejection> for AppError {
    fn from(rejection: axum::extract::rejection::PathRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<crate::config::error::ConfigError> for AppError {
    fn from(error: crate::config::error::ConfigError) -> Self {
        AppError::Configuration {
            key: error.key().to_string(),
            source: error.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, reason) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (field.to_string(), reason)
            })
            .unwrap_or_else(|| ("request".to_string(), errors.to_string()));
        AppError::Validation { field, reason }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
