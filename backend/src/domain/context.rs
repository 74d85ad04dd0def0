//! Per-request context threaded through every core call.
//!
//! A [`RequestContext`] bundles the store handle, the acting operator, the
//! entity configuration and the clock. It also owns a short-lived
//! [`QueryCache`] that memoises index lookups while one response is being
//! composed; the cache dies with the context and never spans requests.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{DocumentStore, DocumentStoreError, IndexName, IndexRow, KeyRange};
use crate::domain::{DomainError, EntityConfig};

/// Authenticated identity recorded on log entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    /// Operator email address.
    pub email: String,
}

impl Operator {
    /// Operator identified by `email`.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Map store port failures onto domain errors.
pub(crate) fn map_store_error(error: DocumentStoreError) -> DomainError {
    match error {
        DocumentStoreError::NotFound { id } => DomainError::not_found(format!("document {id} not found")),
        DocumentStoreError::RevisionConflict { id } => {
            DomainError::conflict(format!("document {id} was modified by another writer"))
        }
        DocumentStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("document store unavailable: {message}"))
        }
        DocumentStoreError::Query { message } => {
            DomainError::internal(format!("document store error: {message}"))
        }
    }
}

/// Memoised range query results for one request.
#[derive(Default)]
pub struct QueryCache {
    rows: Mutex<HashMap<(IndexName, KeyRange), Vec<IndexRow>>>,
}

impl QueryCache {
    fn lock(&self) -> MutexGuard<'_, HashMap<(IndexName, KeyRange), Vec<IndexRow>>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self, index: IndexName, range: &KeyRange) -> Option<Vec<IndexRow>> {
        self.lock().get(&(index, range.clone())).cloned()
    }

    fn put(&self, index: IndexName, range: &KeyRange, rows: Vec<IndexRow>) {
        self.lock().insert((index, range.clone()), rows);
    }

    /// Drop every memoised result.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of memoised queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is memoised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .finish()
    }
}

/// Store handle, operator identity and query cache for one request.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use seqtrack::domain::{EntityConfig, Operator, RequestContext};
/// use seqtrack::outbound::persistence::MemoryDocumentStore;
///
/// let ctx = RequestContext::new(
///     Arc::new(MemoryDocumentStore::new()),
///     EntityConfig::default(),
///     Arc::new(DefaultClock),
/// )
/// .with_operator(Some(Operator::new("per@example.org")));
/// assert_eq!(ctx.operator().map(|op| op.email.as_str()), Some("per@example.org"));
/// ```
pub struct RequestContext {
    store: Arc<dyn DocumentStore>,
    operator: Option<Operator>,
    config: EntityConfig,
    clock: Arc<dyn Clock>,
    cache: QueryCache,
}

impl RequestContext {
    /// Anonymous context with an empty cache.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, config: EntityConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            operator: None,
            config,
            clock,
            cache: QueryCache::default(),
        }
    }

    /// Attach the acting operator.
    #[must_use]
    pub fn with_operator(mut self, operator: Option<Operator>) -> Self {
        self.operator = operator;
        self
    }

    /// Store handle.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Acting operator, if authenticated.
    #[must_use]
    pub const fn operator(&self) -> Option<&Operator> {
        self.operator.as_ref()
    }

    /// Entity configuration.
    #[must_use]
    pub const fn config(&self) -> &EntityConfig {
        &self.config
    }

    /// Current instant from the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    /// Per-request cache.
    #[must_use]
    pub const fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Range query served from the cache when this request already ran it.
    pub async fn cached_range(
        &self,
        index: IndexName,
        range: &KeyRange,
    ) -> Result<Vec<IndexRow>, DomainError> {
        if let Some(rows) = self.cache.get(index, range) {
            debug!(index = %index, rows = rows.len(), "query cache hit");
            return Ok(rows);
        }
        let rows = self.fresh_range(index, range).await?;
        self.cache.put(index, range, rows.clone());
        Ok(rows)
    }

    /// Range query that always reaches the store.
    pub async fn fresh_range(
        &self,
        index: IndexName,
        range: &KeyRange,
    ) -> Result<Vec<IndexRow>, DomainError> {
        self.store
            .range_query(index, range)
            .await
            .map_err(map_store_error)
    }

    /// Forget memoised results after a write.
    pub(crate) fn invalidate(&self) {
        self.cache.clear();
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("operator", &self.operator)
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockable::DefaultClock;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{IndexKey, MockDocumentStore};

    #[rstest]
    #[case(DocumentStoreError::not_found("abc"), ErrorCode::NotFound)]
    #[case(DocumentStoreError::revision_conflict("abc"), ErrorCode::Conflict)]
    #[case(DocumentStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(DocumentStoreError::query("bad view"), ErrorCode::InternalError)]
    fn store_errors_map_to_codes(#[case] error: DocumentStoreError, #[case] code: ErrorCode) {
        assert_eq!(map_store_error(error).code(), code);
    }

    #[tokio::test]
    async fn cached_range_hits_the_store_once() {
        let mut store = MockDocumentStore::new();
        store
            .expect_range_query()
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let ctx = RequestContext::new(Arc::new(store), EntityConfig::default(), Arc::new(DefaultClock));
        let range = KeyRange::exact(IndexKey::new(["P0"]));

        ctx.cached_range(IndexName::ProjectId, &range)
            .await
            .expect("first query");
        ctx.cached_range(IndexName::ProjectId, &range)
            .await
            .expect("memoised query");
        assert_eq!(ctx.cache().len(), 1);

        ctx.invalidate();
        assert!(ctx.cache().is_empty());
    }
}
