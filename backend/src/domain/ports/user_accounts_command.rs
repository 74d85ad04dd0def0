//! Driving port for operator account writes.

use async_trait::async_trait;

use super::SaveRequest;
use crate::domain::{DomainError, Operator, User};

/// Driving port for registering and administering accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountsCommand: Send + Sync {
    /// Register an account; it starts out `pending`.
    async fn register(&self, request: SaveRequest) -> Result<User, DomainError>;

    /// Change name, role or status of the account holding `email`.
    async fn update_user(&self, email: &str, request: SaveRequest) -> Result<User, DomainError>;

    /// Replace the API token of the account holding `email`.
    async fn issue_api_token(
        &self,
        email: &str,
        operator: Option<Operator>,
    ) -> Result<User, DomainError>;
}
