//! Token command handler
//!
//! Mints a bearer token for local use against the HTTP API.

use crate::config::Settings;
use crate::error::AppResult;
use crate::models::Role;
use crate::utils::jwt::generate_access_token;

pub struct TokenCommandHandler {
    config: Settings,
}

impl TokenCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Signs a token for `employee_id` with `roles`.
    ///
    /// `hours` defaults to `jwt.access_token_expiration`.
    pub fn mint(&self, employee_id: i32, roles: &[Role], hours: Option<i64>) -> AppResult<String> {
        self.config.jwt.validate()?;
        let hours = hours.unwrap_or(self.config.jwt.access_token_expiration);
        generate_access_token(employee_id, roles.to_vec(), &self.config.jwt.secret, hours)
    }

    /// Prints the token on stdout so it can be captured by scripts.
    pub fn execute(&self, employee_id: i32, roles: &[Role], hours: Option<i64>) -> AppResult<()> {
        let token = self.mint(employee_id, roles, hours)?;
        tracing::info!(employee_id, ?roles, "Access token issued");
        println!("{token}");
        Ok(())
    }
}
