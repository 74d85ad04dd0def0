//! Operator account services.
//!
//! Accounts go through the same saver as lab entities: the email is a unique
//! identifier field, and every change leaves a log entry. API tokens are
//! logged as a placeholder.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::API_TOKEN;
use crate::domain::field::{FieldValue, JsonPayload};
use crate::domain::hierarchy::find_one;
use crate::domain::ports::{
    DocumentStore, IndexKey, IndexName, SaveRequest, UserAccountsCommand, UserAccountsQuery,
};
use crate::domain::{DomainError, EntityConfig, Operator, RequestContext, Saver, User};

/// Fields a registrant may supply; role and status start at their defaults.
const REGISTRATION_FIELDS: &[&str] = &["email", "name"];

async fn find_by_email(ctx: &RequestContext, email: &str) -> Result<User, DomainError> {
    find_one(ctx, IndexName::UserEmail, IndexKey::new([email]))
        .await?
        .ok_or_else(|| DomainError::not_found(format!("user {email} not found")))
}

/// Account service implementing [`UserAccountsCommand`] and
/// [`UserAccountsQuery`].
#[derive(Clone)]
pub struct UserAccountsService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl UserAccountsService {
    /// Create a service over the given store.
    #[must_use]
    pub const fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn context(&self, operator: Option<Operator>) -> RequestContext {
        RequestContext::new(self.store.clone(), EntityConfig::default(), self.clock.clone())
            .with_operator(operator)
    }
}

#[async_trait]
impl UserAccountsCommand for UserAccountsService {
    async fn register(&self, request: SaveRequest) -> Result<User, DomainError> {
        let ctx = self.context(request.operator);
        let fields: Map<String, Value> = request
            .fields
            .into_iter()
            .filter(|(key, _)| REGISTRATION_FIELDS.contains(&key.as_str()))
            .collect();
        let mut saver = Saver::create(&ctx, User::draft(ctx.now()));
        saver.apply(&JsonPayload(&fields)).await?;
        let user = saver.commit().await?;
        info!(email = %user.email, "user registered");
        Ok(user)
    }

    async fn update_user(&self, email: &str, request: SaveRequest) -> Result<User, DomainError> {
        let ctx = self.context(request.operator);
        let user = find_by_email(&ctx, email).await?;
        let mut saver = Saver::update(&ctx, user);
        saver.apply(&JsonPayload(&request.fields)).await?;
        saver.commit().await
    }

    async fn issue_api_token(
        &self,
        email: &str,
        operator: Option<Operator>,
    ) -> Result<User, DomainError> {
        let ctx = self.context(operator);
        let user = find_by_email(&ctx, email).await?;
        let token = Uuid::new_v4().simple().to_string();
        let mut saver = Saver::update(&ctx, user);
        saver.set_secret(API_TOKEN, Some(FieldValue::Text(token)))?;
        let updated = saver.commit().await?;
        info!(email = %updated.email, "api token issued");
        Ok(updated)
    }
}

#[async_trait]
impl UserAccountsQuery for UserAccountsService {
    async fn user_by_email(&self, email: &str) -> Result<User, DomainError> {
        let ctx = self.context(None);
        find_by_email(&ctx, email).await
    }

    /// Only active accounts authenticate by token.
    async fn user_by_api_token(&self, token: &str) -> Result<User, DomainError> {
        let ctx = self.context(None);
        let holder: Option<User> =
            find_one(&ctx, IndexName::UserApiToken, IndexKey::new([token])).await?;
        match holder {
            Some(user) if user.is_active() => Ok(user),
            Some(_) => Err(DomainError::unauthorized("account is not active")),
            None => Err(DomainError::unauthorized("unknown API token")),
        }
    }
}
