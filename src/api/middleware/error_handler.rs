//! Error handler for converting AppError to HTTP responses.
//!
//! [`AppError`] renders as a JSON [`ErrorResponse`]. The rendered body is
//! also stored in the response extensions so that
//! [`error_response_middleware`] can stamp the request ID on it. Error
//! responses produced by axum itself (unknown route, bad method, extractor
//! rejections) are rewritten into the same shape.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::RequestId;
use crate::api::dto::ErrorResponse;
use crate::error::{AppError, ConstraintKind};

impl IntoResponse for AppError {
    /// # Status Code Mapping
    /// - EntityNotFound → 404
    /// - EntityAlreadyExists → 409
    /// - AccessDenied → 403
    /// - Validation, BadRequest → 400
    /// - Unauthorized → 401
    /// - Constraint → 409 for unique/foreign key, 400 otherwise
    /// - ConnectionPool → 503
    /// - Database, SessionClosed, Configuration, Internal → 500
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = error_body(&self);
        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

fn error_body(error: &AppError) -> ErrorResponse {
    let code = error_to_code(error);
    match error {
        AppError::Validation { field, .. } => {
            ErrorResponse::new(code, error.to_string()).with_details(field)
        }
        AppError::Constraint { table, .. } => {
            ErrorResponse::new(code, error.to_string()).with_details(table)
        }
        AppError::Configuration { key, .. } => {
            ErrorResponse::new(code, "Server configuration error").with_details(key)
        }
        AppError::ConnectionPool { .. } => ErrorResponse::new(code, "Store connection unavailable"),
        AppError::Internal { .. } => ErrorResponse::new(code, "An internal error occurred"),
        _ => ErrorResponse::new(code, error.to_string()),
    }
}

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::EntityNotFound { .. } => StatusCode::NOT_FOUND,
        AppError::EntityAlreadyExists { .. } => StatusCode::CONFLICT,
        AppError::AccessDenied { .. } => StatusCode::FORBIDDEN,
        AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Constraint { kind, .. } => match kind {
            ConstraintKind::Unique | ConstraintKind::ForeignKey => StatusCode::CONFLICT,
            ConstraintKind::NotNull | ConstraintKind::Check => StatusCode::BAD_REQUEST,
        },
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Database { .. }
        | AppError::SessionClosed
        | AppError::Configuration { .. }
        | AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::EntityNotFound { .. } => "NOT_FOUND",
        AppError::EntityAlreadyExists { .. } => "ALREADY_EXISTS",
        AppError::AccessDenied { .. } => "ACCESS_DENIED",
        AppError::Validation { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        AppError::Constraint { .. } => "CONSTRAINT_VIOLATION",
        AppError::Database { .. } => "DATABASE_ERROR",
        AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
        AppError::SessionClosed => "SESSION_CLOSED",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

fn status_to_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNAUTHORIZED => "UNAUTHORIZED",
        StatusCode::FORBIDDEN => "ACCESS_DENIED",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_CONTENT",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::SERVICE_UNAVAILABLE => "SERVICE_UNAVAILABLE",
        s if s.is_server_error() => "INTERNAL_ERROR",
        _ => "REQUEST_FAILED",
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

/// Gives every 4xx/5xx response an [`ErrorResponse`] body carrying the
/// request ID.
///
/// Must run inside [`super::request_id_middleware`].
pub async fn error_response_middleware(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let body = match response.extensions().get::<ErrorResponse>() {
        Some(body) => body.clone(),
        // JSON error bodies built elsewhere are passed through
        None if is_json(&response) => return response,
        None => {
            let (_, body) = response.into_parts();
            let text = axum::body::to_bytes(body, 64 * 1024)
                .await
                .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
                .unwrap_or_default();
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                text
            };
            ErrorResponse::new(status_to_code(status), message)
        }
    };

    let body = match request_id {
        Some(id) => body.with_request_id(&id),
        None => body,
    };
    (status, Json(body)).into_response()
}
