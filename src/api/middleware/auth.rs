//! Bearer-token authentication middleware.
//!
//! Builds the [`SecurityContext`] of each request. A request without an
//! `Authorization` header is anonymous; a header that is present but not a
//! valid bearer token is rejected with 401.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::security::SecurityContext;
use crate::state::AppState;
use crate::utils::jwt::validate_access_token;

/// Places a [`SecurityContext`] in request extensions.
///
/// Handlers read it with `Extension<SecurityContext>`.
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - the header is not valid UTF-8 or lacks the `Bearer ` prefix
/// - the token signature, expiry or subject is invalid
pub async fn security_context_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let context = match request.headers().get(header::AUTHORIZATION) {
        None => SecurityContext::anonymous(),
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or_else(|| AppError::Unauthorized {
                    message: "Invalid authorization header format. Expected: Bearer <token>"
                        .to_string(),
                })?;

            let claims = validate_access_token(token.trim(), &state.jwt_config.secret)?;
            let caller = claims.caller()?;
            tracing::debug!(caller_id = caller.id, "Caller authenticated");
            SecurityContext::for_caller(caller)
        }
    };

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}
