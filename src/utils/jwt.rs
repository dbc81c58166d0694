use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::Role;
use crate::security::Caller;

const SECONDS_PER_HOUR: i64 = 3600;

/// Bearer token claims: the employee id and the roles it acts with.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Employee id
    pub sub: String,
    pub roles: Vec<Role>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(employee_id: i32, roles: Vec<Role>, expiration_hours: i64) -> Self {
        let now = jiff::Timestamp::now().as_second();
        Self {
            sub: employee_id.to_string(),
            roles,
            iat: now,
            exp: now + expiration_hours * SECONDS_PER_HOUR,
        }
    }

    /// Security caller described by the claims.
    pub fn caller(&self) -> AppResult<Caller> {
        let id = self.sub.parse::<i32>().map_err(|_| AppError::Unauthorized {
            message: format!("Token subject '{}' is not an employee id", self.sub),
        })?;
        Ok(Caller::new(id, self.roles.iter().copied()))
    }
}

/// Signs an access token for `employee_id`.
pub fn generate_access_token(
    employee_id: i32,
    roles: Vec<Role>,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let claims = Claims::new(employee_id, roles, expiration_hours);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to generate JWT token: {e}"),
    })
}

/// Verifies signature and expiry and returns the claims.
pub fn validate_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        let message = match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token has expired".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidToken => "Invalid token".to_string(),
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                "Invalid token signature".to_string()
            }
            _ => format!("Token validation failed: {e}"),
        };
        AppError::Unauthorized { message }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "ecotrack-test-secret-0123456789abcdef";

    #[test]
    fn token_round_trips_to_caller() {
        let token = generate_access_token(3, vec![Role::Administrator], SECRET, 1).unwrap();
        let claims = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "3");
        assert_eq!(claims.exp - claims.iat, SECONDS_PER_HOUR);

        let caller = claims.caller().unwrap();
        assert_eq!(caller.id, 3);
        assert!(caller.has_role(Role::Administrator));
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let token = generate_access_token(3, vec![Role::Staff], SECRET, 1).unwrap();
        let err = validate_access_token(&token, "another-secret-another-secret-xx").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[test]
    fn expired_token_is_rejected() {
        // well past the default 60s leeway
        let token = generate_access_token(3, vec![Role::Staff], SECRET, -2).unwrap();
        match validate_access_token(&token, SECRET) {
            Err(AppError::Unauthorized { message }) => assert_eq!(message, "Token has expired"),
            other => panic!("expected expiry error, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            validate_access_token("not-a-token", SECRET),
            Err(AppError::Unauthorized { .. })
        ));
    }

    #[test]
    fn non_numeric_subject_is_unauthorized() {
        let claims = Claims {
            sub: "alice".into(),
            roles: vec![],
            iat: 0,
            exp: 0,
        };
        assert!(matches!(claims.caller(), Err(AppError::Unauthorized { .. })));
    }
}
