//! Driving port for operator account lookups.

use async_trait::async_trait;

use crate::domain::{DomainError, User};

/// Driving port for finding accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountsQuery: Send + Sync {
    /// Account holding `email`.
    async fn user_by_email(&self, email: &str) -> Result<User, DomainError>;

    /// Account holding `token`; unknown tokens are unauthorized.
    async fn user_by_api_token(&self, token: &str) -> Result<User, DomainError>;
}
